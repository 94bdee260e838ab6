/// Scripted window system for unit tests (no window, no driver)
///
/// Refuses or accepts each context request according to a script and
/// records every call so tests can check what the negotiator asked for.

#[cfg(test)]
use std::collections::HashMap;

#[cfg(test)]
use crate::negotiation::{ContextAttribute, ContextAttributes, ContextRequest, WindowSystem};

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedContext {
    pub request: ContextRequest,
}

#[cfg(test)]
#[derive(Debug)]
pub struct ScriptedWindowSystem {
    /// Requests refused, with the error text to report
    refused: HashMap<ContextRequest, String>,
    /// Attribute answers; missing attributes report a query error
    attributes: HashMap<ContextAttribute, Result<i32, String>>,
    surface_size: Option<(u32, u32)>,
    /// Every attribute set handed to create_raw_context
    pub issued: Vec<ContextAttributes>,
}

#[cfg(test)]
impl ScriptedWindowSystem {
    /// Window system accepting every request, double buffered, 24/8 depth/stencil
    pub fn new() -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(ContextAttribute::DoubleBuffer, Ok(1));
        attributes.insert(ContextAttribute::DepthSize, Ok(24));
        attributes.insert(ContextAttribute::StencilSize, Ok(8));
        Self {
            refused: HashMap::new(),
            attributes,
            surface_size: Some((1024, 768)),
            issued: Vec::new(),
        }
    }

    /// Refuse the first `count` requests of the standard ladder
    pub fn refusing_first(count: usize) -> Self {
        let mut system = Self::new();
        for request in ContextRequest::LADDER.iter().take(count) {
            system = system.refuse(*request, &format!("{} not supported by driver", request.name()));
        }
        system
    }

    pub fn refuse(mut self, request: ContextRequest, reason: &str) -> Self {
        self.refused.insert(request, reason.to_string());
        self
    }

    pub fn with_attribute(mut self, attribute: ContextAttribute, answer: Result<i32, String>) -> Self {
        self.attributes.insert(attribute, answer);
        self
    }

    pub fn with_surface_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.surface_size = size;
        self
    }

    pub fn issued_requests(&self) -> Vec<ContextRequest> {
        self.issued.iter().map(|attributes| attributes.request).collect()
    }
}

#[cfg(test)]
impl WindowSystem for ScriptedWindowSystem {
    type Context = ScriptedContext;

    fn create_raw_context(&mut self, attributes: &ContextAttributes) -> Result<ScriptedContext, String> {
        self.issued.push(*attributes);
        match self.refused.get(&attributes.request) {
            Some(reason) => Err(reason.clone()),
            None => Ok(ScriptedContext { request: attributes.request }),
        }
    }

    fn query_attribute(&self, _context: &ScriptedContext, attribute: ContextAttribute) -> Result<i32, String> {
        self.attributes
            .get(&attribute)
            .cloned()
            .unwrap_or_else(|| Err(format!("{} not available", attribute.name())))
    }

    fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }

    fn swap(&self, _context: &ScriptedContext) -> Result<(), String> {
        Ok(())
    }
}
