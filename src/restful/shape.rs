//! Input shapes: typed, validated views over a request's JSON input.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};

pub trait InputShape: Send + Sync {
    /// Short type name, used in route listings and docs.
    fn name(&self) -> &'static str;

    /// Deserialize and validate `input`, returning its normalized form.
    fn parse(&self, input: Value) -> Result<Value>;
}

/// Shape backed by a `Deserialize + Validate` DTO.
pub struct ValidatedShape<T>(PhantomData<fn() -> T>);

impl<T> InputShape for ValidatedShape<T>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn parse(&self, input: Value) -> Result<Value> {
        let dto: T = serde_json::from_value(input)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        dto.validate()?;
        Ok(serde_json::to_value(dto)?)
    }
}

pub fn shape<T>() -> Arc<dyn InputShape>
where
    T: DeserializeOwned + Serialize + Validate + 'static,
{
    Arc::new(ValidatedShape::<T>(PhantomData))
}

/// Accepts any JSON object unchanged.
pub struct AnyObject;

impl InputShape for AnyObject {
    fn name(&self) -> &'static str {
        "Object"
    }

    fn parse(&self, input: Value) -> Result<Value> {
        match input {
            Value::Object(_) => Ok(input),
            _ => Err(AppError::Validation("expected a JSON object".to_string())),
        }
    }
}
