//! 创建前钩子
//!
//! 宿主在插入记录前调用 [`HookRegistry::run_before_create`]，钩子可以修改
//! 待插入的 payload。钩子按注册顺序执行，任一钩子返回错误则中止本次创建。

mod identifier;

pub use identifier::IdentifierHook;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::models::OwnerKind;
use thiserror::Error;

use crate::allocator::AllocError;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Identifier allocation failed: {0}")]
    Allocation(#[from] AllocError),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

pub type HookResult<T> = Result<T, HookError>;

/// Mutable create payload (a JSON object)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatePayload {
    data: Map<String, Value>,
}

impl CreatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; only objects are accepted
    pub fn from_value(value: Value) -> HookResult<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(HookError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Absent, null or empty string
    pub fn is_blank(&self, field: &str) -> bool {
        match self.data.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }
}

/// Pre-insert hook
#[async_trait]
pub trait BeforeCreate: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before_create(&self, payload: &mut CreatePayload) -> HookResult<()>;
}

/// 按模型注册的钩子列表
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<OwnerKind, Vec<Arc<dyn BeforeCreate>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, model: OwnerKind, hook: Arc<dyn BeforeCreate>) {
        tracing::debug!(model = %model, hook = hook.name(), "Subscribed before-create hook");
        self.hooks.entry(model).or_default().push(hook);
    }

    pub fn hook_count(&self, model: OwnerKind) -> usize {
        self.hooks.get(&model).map_or(0, Vec::len)
    }

    /// 依次执行该模型的全部钩子，首个错误即返回
    pub async fn run_before_create(
        &self,
        model: OwnerKind,
        payload: &mut CreatePayload,
    ) -> HookResult<()> {
        let Some(hooks) = self.hooks.get(&model) else {
            return Ok(());
        };
        for hook in hooks {
            if let Err(e) = hook.before_create(payload).await {
                tracing::error!(model = %model, hook = hook.name(), error = %e, "Before-create hook failed, aborting create");
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn log_ready(&self) {
        tracing::info!(
            "Lifecycle hooks ready (user: {}, order: {})",
            self.hook_count(OwnerKind::User),
            self.hook_count(OwnerKind::Order)
        );
    }
}
