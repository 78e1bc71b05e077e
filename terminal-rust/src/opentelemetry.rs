use crate::{classify::ReplyKind, instruction::RequestMode};
use opentelemetry::trace::Status;
use std::future::Future;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

fn reply_kind_str(kind: ReplyKind) -> &'static str {
    match kind {
        ReplyKind::KeySelection => "key_selection",
        ReplyKind::FallbackOffer => "fallback_offer",
        ReplyKind::DomainError => "domain_error",
        ReplyKind::Normal => "normal",
    }
}

pub struct TurnSpan {
    span: Span,
}

impl TurnSpan {
    pub fn new(mode: Option<RequestMode>, history_len: usize, file_count: usize) -> Self {
        let span = info_span!("fintech_terminal.submit_turn");
        span.set_attribute("gen_ai.operation.name", "chat");
        span.set_attribute(
            "fintech_terminal.mode",
            mode.map_or("unset", RequestMode::as_str),
        );
        span.set_attribute(
            "fintech_terminal.history_len",
            i64::try_from(history_len).unwrap_or(i64::MAX),
        );
        span.set_attribute(
            "fintech_terminal.files",
            i64::try_from(file_count).unwrap_or(i64::MAX),
        );
        Self { span }
    }

    pub async fn instrument_future<Fut>(&self, future: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        future.instrument(self.span.clone()).await
    }

    pub fn on_reply(&self, kind: ReplyKind, source_count: usize) {
        self.span
            .set_attribute("fintech_terminal.reply_kind", reply_kind_str(kind));
        self.span.set_attribute(
            "fintech_terminal.sources",
            i64::try_from(source_count).unwrap_or(i64::MAX),
        );
    }

    pub fn on_error(&self, error: &(dyn std::error::Error + 'static), credential: bool) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span
            .set_attribute("fintech_terminal.credential_error", credential);
        self.span.set_status(Status::error(error.to_string()));
    }
}
