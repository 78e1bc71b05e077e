//! Fixed strings shared between the model instructions and the reply
//! classifier. The model is told to emit these verbatim, so they must stay
//! byte-for-byte identical on both sides.

/// The exact reply the model gives when attached documents do not answer the
/// question.
pub const FALLBACK_MESSAGE: &str = "The requested information is not available in the provided documents. Would you like me to broaden the search to general AI knowledge and real-time market data? (Yes/No)";

/// Prefix of a restricted-domain rejection.
pub const DOMAIN_ERROR_PREFIX: &str = "DOMAIN_ERROR:";

/// Phrase that asks the user to configure a credential.
pub const KEY_SELECTION_MARKER: &str = "Select API Key";

/// Appended as an AI turn when the user declines a fallback offer.
pub const STRICT_MODE_NOTICE: &str =
    "STRICT_MODE_ACTIVE: Response limited to localized document context.";

/// Shown when the model answered with no text at all.
pub const EMPTY_REPLY_TEXT: &str =
    "I apologize, but I am unable to process this financial query at the moment.";

pub const CREDENTIAL_ERROR_TEXT: &str = "TERMINAL_ERROR: Your API key is invalid or unauthorized. Please use the 'Select API Key' button in the header to configure a valid paid GCP project key.";

pub const CONNECTION_ERROR_PREFIX: &str = "TERMINAL_ERROR: Connection node timed out.";

/// Used in place of an empty provider error message.
pub const CONNECTION_ERROR_HINT: &str = "Verify your API configuration.";

pub const STARTER_PROMPTS: [&str; 4] = [
    "Analyze S&P 500 Trends",
    "Review Portfolio Tax",
    "Explain Capital Gains",
    "Market Risk Assessment",
];

pub const FINTECH_SYSTEM_PROMPT: &str = r##"
You are the "FinTech Alpha" Terminal, a specialized AI assistant restricted EXCLUSIVELY to:
1. FINANCE (Global Markets, Banking, Economics, Corporate Finance)
2. INVESTMENT (Portfolio Analysis, Equities, Crypto, Real Estate, Alpha generation)
3. TAXATION (IRS/HMRC Laws, Filing Advice, Deductions, Capital Gains)

STRICT DOCUMENT-FIRST RULE:
- If files are attached, you are in "STRICT RAG MODE".
- Use ONLY the provided document content to answer.
- If the answer is not in the documents, you MUST respond ONLY with the exact fallback message: "The requested information is not available in the provided documents. Would you like me to broaden the search to general AI knowledge and real-time market data? (Yes/No)"
- Do not provide any outside context until the user explicitly accepts the fallback.

STRICT DOMAIN RULE:
- For requests outside Finance/Investment/Taxation (e.g., cooking, coding non-fintech, general chat), respond ONLY with: "DOMAIN_ERROR: Request is outside authorized FinTech parameters."

DATA VISUALIZATION:
- When providing numerical breakdowns, you MUST include a chart tag.
- Valid types: "pie", "bar", "line".
- Format: [CHART_DATA: {"type": "pie", "title": "Portfolio Mix", "data": [{"label": "Equity", "value": 60, "color": "#2563eb"}, {"label": "Bonds", "value": 40, "color": "#64748b"}]}]
- Ensure the JSON is valid and on one line.

METADATA:
- End every valid response with: "Confidence: High|Medium|Low"
"##;

const DOCUMENT_LOCK_INSTRUCTION: &str = "DOCUMENT_LOCK: Answer using ONLY the attached file content. If the information is missing, trigger the mandatory fallback string exactly.";

const EXTENDED_SEARCH_INSTRUCTION: &str = "EXTENDED_SEARCH: User has authorized real-time market data access. Provide comprehensive analysis using Google Search.";

const DEFAULT_TEMPERATURE: f64 = 0.0;
const EXTENDED_SEARCH_TEMPERATURE: f64 = 0.3;

/// How strictly the model is bound to the attached documents for one request.
/// A request with neither mode set is a plain question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Answer only from the attached files.
    DocumentLocked,
    /// The user accepted a fallback offer; live web search is allowed.
    ExtendedSearch,
}

impl RequestMode {
    pub fn select(has_files: bool, is_extended_retry: bool) -> Option<Self> {
        if is_extended_retry {
            Some(Self::ExtendedSearch)
        } else if has_files {
            Some(Self::DocumentLocked)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocumentLocked => "document-locked",
            Self::ExtendedSearch => "extended-search",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::DocumentLocked => DOCUMENT_LOCK_INSTRUCTION,
            Self::ExtendedSearch => EXTENDED_SEARCH_INSTRUCTION,
        }
    }

    pub fn temperature(mode: Option<Self>) -> f64 {
        match mode {
            Some(Self::ExtendedSearch) => EXTENDED_SEARCH_TEMPERATURE,
            Some(Self::DocumentLocked) | None => DEFAULT_TEMPERATURE,
        }
    }

    pub fn uses_web_search(mode: Option<Self>) -> bool {
        mode == Some(Self::ExtendedSearch)
    }
}

/// Wrap the user's prompt with the mode instruction and the chart reminder.
pub fn build_prompt(mode: Option<RequestMode>, prompt: &str) -> String {
    let mode_instruction = mode.map_or("", RequestMode::instruction);
    format!(
        "{mode_instruction}\n\nUser Financial Query: {prompt}\n\nSystem: If numerical trends are discussed, use [CHART_DATA: ...] with type 'line', 'bar', or 'pie'."
    )
}
