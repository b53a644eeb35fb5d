use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// `{ "message": ..., <fields of T>, "meta"?: ... }`
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(flatten)]
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data,
            meta,
        }
    }
}

/// Payload for responses that only carry a message.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct NoData {}

impl ApiResponse<NoData> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(message, NoData {}, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Checkout {
        order_id: u32,
    }

    #[test]
    fn data_fields_sit_next_to_message() {
        let body = ApiResponse::success("Checkout success", Checkout { order_id: 7 }, None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Checkout success", "orderId": 7 })
        );
    }

    #[test]
    fn message_only_body_has_no_extra_fields() {
        let json = serde_json::to_value(ApiResponse::message("All items removed from cart")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "All items removed from cart" }));
    }

    #[test]
    fn meta_is_serialized_when_present() {
        let body = ApiResponse::success("Products", NoData {}, Some(Meta::new(2, 10, 35)));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["meta"]["page"], 2);
        assert_eq!(json["meta"]["per_page"], 10);
        assert_eq!(json["meta"]["total"], 35);
    }
}
