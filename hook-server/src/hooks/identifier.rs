use std::sync::Arc;

use async_trait::async_trait;
use shared::models::OwnerKind;

use super::{BeforeCreate, CreatePayload, HookResult};
use crate::allocator::{IdentifierAllocator, Scheme, SequenceSource};

/// Fills an identifier field on create when the payload leaves it blank
pub struct IdentifierHook {
    field: &'static str,
    owner: OwnerKind,
    scheme: Scheme,
    allocator: Arc<IdentifierAllocator>,
}

impl IdentifierHook {
    pub fn new(
        field: &'static str,
        owner: OwnerKind,
        scheme: Scheme,
        allocator: Arc<IdentifierAllocator>,
    ) -> Self {
        Self {
            field,
            owner,
            scheme,
            allocator,
        }
    }

    /// `user_id` from the random scheme
    pub fn user_id(allocator: Arc<IdentifierAllocator>, prefix: impl Into<String>) -> Self {
        Self::new("user_id", OwnerKind::User, Scheme::random(prefix), allocator)
    }

    /// `order_no` from the sequential scheme
    pub fn order_number(
        allocator: Arc<IdentifierAllocator>,
        prefix: impl Into<String>,
        source: SequenceSource,
    ) -> Self {
        Self::new(
            "order_no",
            OwnerKind::Order,
            Scheme::sequential(prefix, source),
            allocator,
        )
    }
}

#[async_trait]
impl BeforeCreate for IdentifierHook {
    fn name(&self) -> &'static str {
        match self.owner {
            OwnerKind::User => "user_id_generator",
            OwnerKind::Order => "order_no_generator",
        }
    }

    async fn before_create(&self, payload: &mut CreatePayload) -> HookResult<()> {
        if !payload.is_blank(self.field) {
            tracing::debug!(field = self.field, "Identifier supplied by caller, keeping it");
            return Ok(());
        }
        let id = self.allocator.allocate(&self.scheme, self.owner).await?;
        tracing::info!(owner = %self.owner, field = self.field, value = %id.value, "Generated identifier");
        payload.set(self.field, id.value);
        Ok(())
    }
}
