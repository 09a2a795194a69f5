/// レスポンス組み立てヘルパー
///
/// 全レスポンス共通のエンベロープ（Content-Type + CORSヘッダー）を
/// 一箇所で組み立てる。エラーボディは`{"message": ...}`または
/// `{"error": ...}`の2系統がある（ハンドラー系統ごとに使い分ける）。
use lambda_http::{Body, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// JSONボディ付きレスポンスを組み立てる
pub fn respond_json<T: Serialize>(status: u16, body: &T) -> Response<Body> {
    match serde_json::to_string(body) {
        Ok(json) => with_headers(status, Body::Text(json)),
        Err(e) => {
            error!(error = %e, "レスポンスボディのシリアライズに失敗");
            with_headers(
                500,
                Body::Text(r#"{"message":"Internal server error"}"#.to_string()),
            )
        }
    }
}

/// ボディなしレスポンスを組み立てる（204など）
pub fn respond_empty(status: u16) -> Response<Body> {
    with_headers(status, Body::Empty)
}

/// `{"message": ...}`ボディのレスポンスを組み立てる
pub fn message(status: u16, text: &str) -> Response<Body> {
    respond_json(status, &json!({ "message": text }))
}

/// `{"error": ...}`ボディのレスポンスを組み立てる
pub fn error(status: u16, text: &str) -> Response<Body> {
    respond_json(status, &json!({ "error": text }))
}

fn with_headers(status: u16, body: Body) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS")
        .header(
            "Access-Control-Allow-Headers",
            "Content-Type,Authorization,Chrome",
        )
        .body(body)
        // ステータスとヘッダーは固定値なので組み立ては失敗しない
        .unwrap_or_else(|_| Response::new(Body::Empty))
}
