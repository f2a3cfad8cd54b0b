//! Ordered handler registry with first-match resolution.

use crate::acme::AcmeHandler;
use crate::globex::GlobexHandler;
use crate::handler::{PageContext, PlatformHandler};

/// The fixed, ordered set of platform handlers. Detection runs in
/// registration order and the first claim wins, which makes the order itself
/// the disambiguation policy when several handlers could match a page.
/// Supporting a new platform means appending one handler here.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn PlatformHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in platforms, in their tie-break order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AcmeHandler::default()));
        registry.register(Box::new(GlobexHandler::default()));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn PlatformHandler>) {
        self.handlers.push(handler);
    }

    /// First handler whose detection predicate claims the page.
    pub fn find(&self, ctx: &PageContext) -> Option<&dyn PlatformHandler> {
        self.handlers
            .iter()
            .find(|h| h.detect(ctx))
            .map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
