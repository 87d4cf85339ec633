use curable_llm::{
    AssistantClient, ChatClient, ChatOptions, ChatRequest, ListOrder, Message, MessageRole,
    OpenAIClient, ResponseFormat, RunStatus,
};
use mockito::Matcher;
use serde_json::json;

fn client_for(server: &mockito::ServerGuard) -> OpenAIClient {
    OpenAIClient::new("sk-test").unwrap().with_base_url(server.url())
}

#[tokio::test]
async fn test_chat_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"summary\":\"ok\"}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = ChatRequest::new("gpt-4o-mini", vec![Message::human("Assess")])
        .with_options(ChatOptions::new().response_format(ResponseFormat::JsonObject));
    let response = client_for(&server).chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.text().unwrap(), "{\"summary\":\"ok\"}");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 17);
}

#[tokio::test]
async fn test_chat_error_includes_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("Hi")]))
        .await
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("401"));
    assert!(text.contains("Incorrect API key"));
}

#[tokio::test]
async fn test_thread_and_message_creation() {
    let mut server = mockito::Server::new_async().await;
    let thread_mock = server
        .mock("POST", "/threads")
        .match_header("openai-beta", "assistants=v2")
        .with_status(200)
        .with_body(r#"{"id":"thread_1","object":"thread","created_at":1717000000}"#)
        .create_async()
        .await;
    let message_mock = server
        .mock("POST", "/threads/thread_1/messages")
        .match_body(Matcher::Json(json!({"role": "user", "content": "I slept badly"})))
        .with_status(200)
        .with_body(
            json!({
                "id": "msg_1",
                "object": "thread.message",
                "thread_id": "thread_1",
                "role": "user",
                "created_at": 1717000001,
                "content": [{"type": "text", "text": {"value": "I slept badly", "annotations": []}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let thread = client.create_thread().await.unwrap();
    let message = client
        .add_message(&thread.id, MessageRole::User, "I slept badly")
        .await
        .unwrap();

    thread_mock.assert_async().await;
    message_mock.assert_async().await;
    assert_eq!(thread.id, "thread_1");
    assert_eq!(message.text(), Some("I slept badly"));
}

#[tokio::test]
async fn test_list_messages_follows_pagination() {
    let mut server = mockito::Server::new_async().await;
    let first_page = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::Regex("^order=asc&limit=100$".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {"id": "msg_1", "thread_id": "thread_1", "role": "user", "created_at": 1,
                     "content": [{"type": "text", "text": {"value": "first", "annotations": []}}]}
                ],
                "first_id": "msg_1",
                "last_id": "msg_1",
                "has_more": true
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second_page = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::UrlEncoded("after".to_string(), "msg_1".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {"id": "msg_2", "thread_id": "thread_1", "role": "assistant", "created_at": 2,
                     "content": [{"type": "text", "text": {"value": "second", "annotations": []}}]}
                ],
                "first_id": "msg_2",
                "last_id": "msg_2",
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = client_for(&server)
        .list_messages("thread_1", ListOrder::Asc)
        .await
        .unwrap();

    first_page.assert_async().await;
    second_page.assert_async().await;
    let texts: Vec<_> = messages.iter().filter_map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_recent_messages_reads_one_page() {
    let mut server = mockito::Server::new_async().await;
    let page = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::Regex("^order=desc&limit=20$".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {"id": "msg_9", "thread_id": "thread_1", "role": "assistant", "created_at": 9,
                     "content": [{"type": "text", "text": {"value": "newest", "annotations": []}}]}
                ],
                "first_id": "msg_9",
                "last_id": "msg_9",
                "has_more": true
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let messages = client_for(&server).recent_messages("thread_1", 20).await.unwrap();

    page.assert_async().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text(), Some("newest"));
}

#[tokio::test]
async fn test_create_and_retrieve_run() {
    let mut server = mockito::Server::new_async().await;
    let _create = server
        .mock("POST", "/threads/thread_1/runs")
        .match_body(Matcher::Json(json!({"assistant_id": "asst_1"})))
        .with_status(200)
        .with_body(r#"{"id":"run_1","object":"thread.run","thread_id":"thread_1","status":"queued"}"#)
        .create_async()
        .await;
    let _retrieve = server
        .mock("GET", "/threads/thread_1/runs/run_1")
        .with_status(200)
        .with_body(
            r#"{"id":"run_1","object":"thread.run","thread_id":"thread_1","status":"failed","last_error":{"code":"rate_limit_exceeded","message":"slow down"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let run = client.create_run("thread_1", "asst_1").await.unwrap();
    assert_eq!(run.status, RunStatus::Queued);

    let run = client.retrieve_run("thread_1", &run.id).await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.last_error.unwrap().code, "rate_limit_exceeded");
}
