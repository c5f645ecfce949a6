//! 产品请求体校验
//!
//! 收集全部违规项后合并为一个 `Validation failed: a, b, c` 错误，不在第一项失败时返回。

use serde_json::{Map, Value};

use super::model::{NewProduct, ProductPatch};
use crate::core::{error::AppError, extract::Validate};

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const CATEGORY_MAX_CHARS: usize = 50;
pub const PRICE_MAX: f64 = 999_999.99;

const PRICE_NEGATIVE: &str = "Price must be a non-negative number";
const PRICE_TOO_HIGH: &str = "Price must be less than $999,999.99";
const IN_STOCK_NOT_BOOL: &str = "inStock must be a boolean value";
const EMPTY_UPDATE: &str = "At least one field must be provided for update";

fn finish<T>(errors: Vec<String>, value: impl FnOnce() -> T) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(AppError::validation(format!(
            "Validation failed: {}",
            errors.join(", ")
        )))
    }
}

/// 非空（trim 后）字符串
fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn too_long(value: Option<&str>, max: usize) -> bool {
    value.map_or(false, |s| s.chars().count() > max)
}

fn length_message(field: &str, max: usize) -> String {
    format!("{} must be less than {} characters", field, max)
}

/// 可选字符串字段：类型错误或长度超限时返回错误信息
fn check_optional_text(
    body: &Map<String, Value>,
    key: &str,
    label: &str,
    max: usize,
    errors: &mut Vec<String>,
) -> Option<String> {
    let value = body.get(key)?;
    match non_blank(Some(value)) {
        None => {
            errors.push(format!("{} must be a non-empty string", label));
            None
        }
        Some(s) if too_long(Some(s), max) => {
            errors.push(length_message(label, max));
            None
        }
        Some(s) => Some(s.to_string()),
    }
}

impl Validate for NewProduct {
    fn validate(body: &Map<String, Value>) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let name = non_blank(body.get("name"));
        if name.is_none() {
            errors.push("Name is required and must be a non-empty string".to_string());
        }

        let description = non_blank(body.get("description"));
        if description.is_none() {
            errors.push("Description is required and must be a non-empty string".to_string());
        }

        let price = match body.get("price") {
            None | Some(Value::Null) => {
                errors.push("Price is required".to_string());
                None
            }
            Some(value) => match value.as_f64() {
                Some(p) if p >= 0.0 => Some(p),
                _ => {
                    errors.push(PRICE_NEGATIVE.to_string());
                    None
                }
            },
        };

        let category = non_blank(body.get("category"));
        if category.is_none() {
            errors.push("Category is required and must be a non-empty string".to_string());
        }

        let in_stock = match body.get("inStock") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                errors.push(IN_STOCK_NOT_BOOL.to_string());
                None
            }
        };

        if too_long(name, NAME_MAX_CHARS) {
            errors.push(length_message("Name", NAME_MAX_CHARS));
        }
        if too_long(description, DESCRIPTION_MAX_CHARS) {
            errors.push(length_message("Description", DESCRIPTION_MAX_CHARS));
        }
        if too_long(category, CATEGORY_MAX_CHARS) {
            errors.push(length_message("Category", CATEGORY_MAX_CHARS));
        }
        if price.map_or(false, |p| p > PRICE_MAX) {
            errors.push(PRICE_TOO_HIGH.to_string());
        }

        finish(errors, || NewProduct {
            name: name.unwrap_or_default().to_string(),
            description: description.unwrap_or_default().to_string(),
            price: price.unwrap_or_default(),
            category: category.unwrap_or_default().to_string(),
            in_stock,
        })
    }
}

impl Validate for ProductPatch {
    fn validate(body: &Map<String, Value>) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let name = check_optional_text(body, "name", "Name", NAME_MAX_CHARS, &mut errors);
        let description = check_optional_text(
            body,
            "description",
            "Description",
            DESCRIPTION_MAX_CHARS,
            &mut errors,
        );

        let price = match body.get("price") {
            None => None,
            Some(value) => match value.as_f64() {
                Some(p) if p < 0.0 => {
                    errors.push(PRICE_NEGATIVE.to_string());
                    None
                }
                Some(p) if p > PRICE_MAX => {
                    errors.push(PRICE_TOO_HIGH.to_string());
                    None
                }
                Some(p) => Some(p),
                None => {
                    errors.push(PRICE_NEGATIVE.to_string());
                    None
                }
            },
        };

        let category =
            check_optional_text(body, "category", "Category", CATEGORY_MAX_CHARS, &mut errors);

        let in_stock = match body.get("inStock") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                errors.push(IN_STOCK_NOT_BOOL.to_string());
                None
            }
        };

        // 只判断请求体是否为空；未知字段不参与合并
        if body.is_empty() {
            errors.push(EMPTY_UPDATE.to_string());
        }

        finish(errors, || ProductPatch {
            name,
            description,
            price,
            category,
            in_stock,
        })
    }
}
