use parley_llm::{ChatOptions, ChatRequest, Content, Message};

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("gpt-4o", messages);

    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new().temperature(0.2).max_tokens(100);
    let request = ChatRequest::new("gpt-4o", vec![Message::human("Hello")]).with_options(options);

    assert_eq!(request.options.temperature, Some(0.2));
    assert_eq!(request.options.max_tokens, Some(100));
}

#[test]
fn test_content_plain_text() {
    assert_eq!(Content::text("abc").to_plain_text(), "abc");

    let parts: Content = serde_json::from_str(
        r#"[{"type": "text", "text": "one"}, {"type": "text", "text": "two"}]"#,
    )
    .unwrap();
    assert_eq!(parts.as_text(), None);
    assert_eq!(parts.to_plain_text(), "one\ntwo");
}
