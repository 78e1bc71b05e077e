use fintech_sdk::{
    fintech_sdk_test::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelResponse, Part,
};

fn user_input(text: &str) -> LanguageModelInput {
    LanguageModelInput {
        messages: vec![Message::user(vec![Part::text(text)])],
        ..LanguageModelInput::default()
    }
}

#[tokio::test]
async fn mock_language_model_tracks_generate_inputs_and_returns_results() {
    let model = MockLanguageModel::new();

    let response1 = ModelResponse {
        content: vec![Part::text("Hello, world!")],
        ..ModelResponse::default()
    };
    let response3 = ModelResponse {
        content: vec![Part::text("Goodbye, world!")],
        ..ModelResponse::default()
    };

    model
        .enqueue_generate(response1.clone())
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
            "generate error".to_string(),
        )))
        .enqueue_generate(response3.clone());

    let input1 = user_input("Hi");
    let res1 = model
        .generate(input1.clone())
        .await
        .expect("first generate should succeed");
    assert_eq!(res1, response1);
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].messages, input1.messages);

    let input2 = user_input("Error");
    let err = model
        .generate(input2.clone())
        .await
        .expect_err("second generate should error");
    match err {
        LanguageModelError::InvalidInput(msg) => {
            assert_eq!(msg, "generate error");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 2);
    assert_eq!(tracked[1].messages, input2.messages);

    let input3 = user_input("Goodbye");
    let res3 = model
        .generate(input3.clone())
        .await
        .expect("third generate should succeed");
    assert_eq!(res3, response3);
    assert_eq!(model.tracked_generate_inputs().len(), 3);

    model.reset();
    assert!(model.tracked_generate_inputs().is_empty());
}

#[tokio::test]
async fn mock_language_model_errors_when_queue_is_empty() {
    let model = MockLanguageModel::new();
    model.enqueue_generate(ModelResponse::default());
    model.restore();

    let err = model
        .generate(user_input("Anything"))
        .await
        .expect_err("no results enqueued");

    assert!(matches!(err, LanguageModelError::Invariant("mock", _)));
    assert_eq!(model.tracked_generate_inputs().len(), 1);
}

#[tokio::test]
async fn mock_language_model_reports_overridden_identity() {
    let mut model = MockLanguageModel::new();
    model.set_provider("google");
    model.set_model_id("gemini-3-pro-preview");

    assert_eq!(model.provider(), "google");
    assert_eq!(model.model_id(), "gemini-3-pro-preview");
}
