use super::{
    BusinessRegistrationHandler, DelegateRegistrationHandler, DelegateResignationHandler,
    MultiSignatureHandler, SecondSignatureHandler, StakeCreateHandler, TransactionHandler,
    TransferHandler, VoteHandler,
};
use crate::error::HandlerError;
use std::collections::HashMap;
use std::fmt;
use tally_transactions::TransactionType;

/// Transaction type → handler.
pub struct HandlerRegistry {
    handlers: HashMap<TransactionType, Box<dyn TransactionHandler>>,
}

impl HandlerRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with every built-in handler.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TransferHandler));
        registry.register(Box::new(SecondSignatureHandler));
        registry.register(Box::new(DelegateRegistrationHandler));
        registry.register(Box::new(VoteHandler));
        registry.register(Box::new(MultiSignatureHandler));
        registry.register(Box::new(DelegateResignationHandler));
        registry.register(Box::new(BusinessRegistrationHandler));
        registry.register(Box::new(StakeCreateHandler));
        registry
    }

    /// Register `handler` for its type, returning the handler it replaced.
    pub fn register(
        &mut self,
        handler: Box<dyn TransactionHandler>,
    ) -> Option<Box<dyn TransactionHandler>> {
        self.handlers.insert(handler.transaction_type(), handler)
    }

    pub fn get(&self, ty: TransactionType) -> Result<&dyn TransactionHandler, HandlerError> {
        self.handlers
            .get(&ty)
            .map(|h| h.as_ref())
            .ok_or(HandlerError::NotRegistered(ty))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().map(|t| t.as_str()).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("types", &types)
            .finish()
    }
}
