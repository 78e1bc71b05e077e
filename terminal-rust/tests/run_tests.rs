use fintech_sdk::{
    fintech_sdk_test::MockLanguageModel,
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult, Message,
    ModelResponse, Part, Tool, WebSource,
};
use fintech_terminal::{
    instruction::{
        build_prompt, CONNECTION_ERROR_PREFIX, CREDENTIAL_ERROR_TEXT, EMPTY_REPLY_TEXT,
        FALLBACK_MESSAGE, FINTECH_SYSTEM_PROMPT, STRICT_MODE_NOTICE,
    },
    interpret, AttachedFile, ChatSession, Reply, RequestMode, Sender, SessionContext, Source,
    Terminal, TerminalError, DEFAULT_MODEL_ID, DEFAULT_SOURCE_TITLE,
};
use std::sync::Arc;
use tokio::sync::Notify;

fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![Part::text(text)],
        ..ModelResponse::default()
    }
}

fn new_session(model: &Arc<MockLanguageModel>) -> ChatSession {
    Terminal::builder(model.clone()).build().create_session()
}

fn last_prompt(input: &LanguageModelInput) -> Part {
    input
        .messages
        .last()
        .and_then(|message| message.content().last())
        .cloned()
        .expect("current turn has a prompt part")
}

#[tokio::test]
async fn empty_submission_is_a_noop() {
    let model = Arc::new(MockLanguageModel::new());
    let session = new_session(&model);
    let mut context = SessionContext::default();

    let result = session
        .submit_turn(&mut context, "   ", vec![], false)
        .await
        .expect("no-op succeeds");

    assert_eq!(result, None);
    assert!(session.turns().await.is_empty());
    assert!(session.pending_context().await.is_none());
    assert!(model.tracked_generate_inputs().is_empty());
}

#[tokio::test]
async fn plain_question_appends_user_and_ai_turns() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(text_response("Capital gains are taxed on sale. Confidence: High"));
    let session = new_session(&model);
    let mut context = SessionContext::default();

    let turn = session
        .submit_turn(&mut context, "Explain Capital Gains", vec![], false)
        .await
        .expect("submit succeeds")
        .expect("a turn is produced");

    assert_eq!(turn.sender, Sender::Ai);
    assert_eq!(turn.text, "Capital gains are taxed on sale. Confidence: High");
    assert_eq!(turn.sources, None);

    let turns = session.turns().await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].sender, Sender::User);
    assert_eq!(turns[0].text, "Explain Capital Gains");
    assert_eq!(turns[1], turn);

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 1);
    let input = &inputs[0];
    assert_eq!(input.system_prompt.as_deref(), Some(FINTECH_SYSTEM_PROMPT));
    assert_eq!(input.messages.len(), 1);
    assert_eq!(
        input.messages[0],
        Message::user(vec![Part::text(build_prompt(None, "Explain Capital Gains"))])
    );
    assert_eq!(input.temperature, Some(0.0));
    assert_eq!(input.tools, None);

    let pending = session.pending_context().await.expect("pending context");
    assert_eq!(pending.prompt, "Explain Capital Gains");
    assert!(!session.is_generating());
    assert!(context.credential_valid);
}

#[tokio::test]
async fn eighth_turn_sends_only_five_prior_turns() {
    let model = Arc::new(MockLanguageModel::new());
    for index in 1..=8 {
        model.enqueue_generate(text_response(&format!("a{index}")));
    }
    let session = new_session(&model);
    let mut context = SessionContext::default();

    for index in 1..=8 {
        session
            .submit_turn(&mut context, &format!("q{index}"), vec![], false)
            .await
            .expect("submit succeeds");
    }

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 8);
    let eighth = &inputs[7];
    assert_eq!(
        eighth.messages,
        vec![
            Message::assistant(vec![Part::text("a5")]),
            Message::user(vec![Part::text("q6")]),
            Message::assistant(vec![Part::text("a6")]),
            Message::user(vec![Part::text("q7")]),
            Message::assistant(vec![Part::text("a7")]),
            Message::user(vec![Part::text(build_prompt(None, "q8"))]),
        ]
    );
    assert_eq!(session.turns().await.len(), 16);
}

#[tokio::test]
async fn attached_files_lock_the_request_to_documents() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(text_response("Net income was $4.2M. Confidence: Medium"));
    let session = new_session(&model);
    let mut context = SessionContext::default();
    let files = vec![
        AttachedFile::new("q3.csv", "text/csv", "metric,value\nnet_income,4.2"),
        AttachedFile::new("slide.png", "image/png", "aGVsbG8="),
    ];

    session
        .submit_turn(&mut context, "What was net income?", files.clone(), false)
        .await
        .expect("submit succeeds");

    let input = &model.tracked_generate_inputs()[0];
    assert_eq!(input.temperature, Some(0.0));
    assert_eq!(input.tools, None);
    assert_eq!(
        input.messages,
        vec![Message::user(vec![
            Part::text(
                "Attached Document Content (Filename: q3.csv):\n---BEGIN---\nmetric,value\nnet_income,4.2\n---END---"
            ),
            Part::image("aGVsbG8=", "image/png"),
            Part::text(build_prompt(
                Some(RequestMode::DocumentLocked),
                "What was net income?"
            )),
        ])]
    );

    let turns = session.turns().await;
    assert_eq!(turns[0].attached_files, files);
}

#[tokio::test]
async fn files_without_prompt_are_submitted() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(text_response("Summary."));
    let session = new_session(&model);
    let mut context = SessionContext::default();

    let turn = session
        .submit_turn(
            &mut context,
            "",
            vec![AttachedFile::new("notes.txt", "text/plain", "EBITDA up")],
            false,
        )
        .await
        .expect("submit succeeds");

    assert!(turn.is_some());
    assert_eq!(model.tracked_generate_inputs().len(), 1);
}

#[tokio::test]
async fn accepting_fallback_retries_with_web_search() {
    let model = Arc::new(MockLanguageModel::new());
    model
        .enqueue_generate(text_response(FALLBACK_MESSAGE))
        .enqueue_generate(ModelResponse {
            content: vec![Part::text("Rates held at 5.25%. Confidence: High")],
            sources: Some(vec![
                WebSource::new("https://example.com/fed").with_title("Fed statement"),
                WebSource::new("https://example.com/untitled"),
            ]),
            usage: None,
        });
    let session = new_session(&model);
    let mut context = SessionContext::default();
    let files = vec![AttachedFile::new("memo.txt", "text/plain", "Quarterly memo")];

    let offer = session
        .submit_turn(&mut context, "Latest Fed decision?", files, false)
        .await
        .expect("submit succeeds")
        .expect("offer turn");
    assert_eq!(interpret(&offer), Reply::FallbackOffer(FALLBACK_MESSAGE.to_string()));

    let answer = session
        .accept_fallback(&mut context)
        .await
        .expect("retry succeeds")
        .expect("answer turn");

    assert_eq!(
        answer.sources,
        Some(vec![
            Source::new("Fed statement", "https://example.com/fed"),
            Source::new(DEFAULT_SOURCE_TITLE, "https://example.com/untitled"),
        ])
    );

    let turns = session.turns().await;
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2], answer);

    let retry = &model.tracked_generate_inputs()[1];
    assert_eq!(retry.temperature, Some(0.3));
    assert_eq!(retry.tools, Some(vec![Tool::WebSearch]));
    assert_eq!(retry.messages.len(), 3);
    let current = retry.messages[2].content();
    assert_eq!(current.len(), 2);
    assert_eq!(
        last_prompt(retry),
        Part::text(build_prompt(
            Some(RequestMode::ExtendedSearch),
            "Latest Fed decision?"
        ))
    );

    let pending = session.pending_context().await.expect("pending context");
    assert_eq!(pending.prompt, "Latest Fed decision?");
}

#[tokio::test]
async fn accepting_fallback_without_history_does_nothing() {
    let model = Arc::new(MockLanguageModel::new());
    let session = new_session(&model);
    let mut context = SessionContext::default();

    let result = session
        .accept_fallback(&mut context)
        .await
        .expect("no-op succeeds");

    assert_eq!(result, None);
    assert!(model.tracked_generate_inputs().is_empty());
}

#[tokio::test]
async fn declining_fallback_appends_strict_mode_notice() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(text_response(FALLBACK_MESSAGE));
    let session = new_session(&model);
    let mut context = SessionContext::default();

    session
        .submit_turn(&mut context, "Dividend policy?", vec![], false)
        .await
        .expect("submit succeeds");
    let notice = session.decline_fallback().await;

    assert_eq!(notice.sender, Sender::Ai);
    assert_eq!(notice.text, STRICT_MODE_NOTICE);
    assert_eq!(session.turns().await.len(), 3);
    assert_eq!(model.tracked_generate_inputs().len(), 1);
}

#[tokio::test]
async fn unauthorized_failures_flag_the_credential() {
    for message in [
        "Unauthorized",
        "UNAUTHORIZED caller",
        "request unauthorized",
        "API Key Not Valid",
    ] {
        let model = Arc::new(MockLanguageModel::new());
        model.enqueue_generate(LanguageModelError::InvalidInput(message.to_string()));
        let session = new_session(&model);
        let mut context = SessionContext::default();

        let turn = session
            .submit_turn(&mut context, "Portfolio risk?", vec![], false)
            .await
            .expect("failure becomes a turn")
            .expect("error turn");

        assert_eq!(turn.text, CREDENTIAL_ERROR_TEXT, "{message}");
        assert!(!context.credential_valid, "{message}");
        assert!(context.needs_key());
        assert_eq!(interpret(&turn), Reply::KeySelection(CREDENTIAL_ERROR_TEXT.to_string()));
        assert!(!session.is_generating());
    }
}

#[tokio::test]
async fn other_failures_become_connection_errors() {
    let model = Arc::new(MockLanguageModel::new());
    let session = new_session(&model);
    let mut context = SessionContext::default();

    // Nothing enqueued: the mock fails with an invariant error.
    let turn = session
        .submit_turn(&mut context, "Market Risk Assessment", vec![], false)
        .await
        .expect("failure becomes a turn")
        .expect("error turn");

    assert_eq!(
        turn.text,
        "TERMINAL_ERROR: Connection node timed out. Invariant from mock: no mocked generate results available"
    );
    assert!(context.credential_valid);
    assert_eq!(session.turns().await.len(), 2);

    model.enqueue_generate(text_response("Recovered."));
    let next = session
        .submit_turn(&mut context, "Try again", vec![], false)
        .await
        .expect("submit succeeds")
        .expect("turn");
    assert_eq!(next.text, "Recovered.");
}

#[tokio::test]
async fn connection_error_turn_does_not_reveal_the_api_key() {
    let model = Arc::new(GoogleModel::new(
        DEFAULT_MODEL_ID,
        GoogleModelOptions {
            api_key: "SECRET-KEY-123".to_string(),
            // Nothing listens on the discard port.
            base_url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        },
    ));
    let session = Terminal::builder(model).build().create_session();
    let mut context = SessionContext::default();

    let turn = session
        .submit_turn(&mut context, "Portfolio risk?", vec![], false)
        .await
        .expect("failure becomes a turn")
        .expect("error turn");

    assert!(turn.text.starts_with(CONNECTION_ERROR_PREFIX), "{}", turn.text);
    assert!(!turn.text.contains("SECRET-KEY-123"), "{}", turn.text);
    assert!(context.credential_valid);
}

#[tokio::test]
async fn empty_reply_is_replaced() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(ModelResponse::default());
    let session = new_session(&model);
    let mut context = SessionContext::default();

    let turn = session
        .submit_turn(&mut context, "Review Portfolio Tax", vec![], false)
        .await
        .expect("submit succeeds")
        .expect("turn");

    assert_eq!(turn.text, EMPTY_REPLY_TEXT);
}

#[tokio::test]
async fn staged_input_is_submitted_and_cleared() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(text_response("Done."));
    let session = new_session(&model);
    let mut context = SessionContext::default();
    let file = AttachedFile::new("ledger.csv", "text/csv", "a,b");

    session.stage_text("Summarize the ledger").await;
    session.stage_file(file.clone()).await;
    assert!(!session.staged().await.is_empty());

    session
        .submit_staged(&mut context)
        .await
        .expect("submit succeeds");

    assert!(session.staged().await.is_empty());
    let turns = session.turns().await;
    assert_eq!(turns[0].text, "Summarize the ledger");
    assert_eq!(turns[0].attached_files, vec![file]);
}

#[tokio::test]
async fn staged_input_can_be_cleared() {
    let model = Arc::new(MockLanguageModel::new());
    let session = new_session(&model);
    let mut context = SessionContext::default();

    session.stage_text("draft").await;
    session.clear_staged().await;

    let result = session.submit_staged(&mut context).await.expect("no-op");
    assert_eq!(result, None);
}

#[derive(Default)]
struct GatedModel {
    entered: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl LanguageModel for GatedModel {
    fn provider(&self) -> &'static str {
        "gated"
    }

    fn model_id(&self) -> String {
        "gated-model".to_string()
    }

    async fn generate(&self, _input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(text_response("done"))
    }
}

#[tokio::test]
async fn concurrent_submission_is_rejected() {
    let model = Arc::new(GatedModel::default());
    let session = Terminal::builder(model.clone()).build().create_session();
    let mut first_context = SessionContext::default();
    let mut second_context = SessionContext::default();

    let first = session.submit_turn(&mut first_context, "first", vec![], false);
    let second = async {
        model.entered.notified().await;
        assert!(session.is_generating());
        let rejected = session
            .submit_turn(&mut second_context, "second", vec![], false)
            .await;
        model.release.notify_one();
        rejected
    };

    let (first, second) = tokio::join!(first, second);

    let turn = first.expect("first succeeds").expect("turn");
    assert_eq!(turn.text, "done");
    assert!(matches!(second, Err(TerminalError::TurnInFlight)));
    assert!(!session.is_generating());

    let turns = session.turns().await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "first");
}
