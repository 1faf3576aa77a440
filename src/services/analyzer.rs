//! AI classification of reviews and emails, and reply drafting.
//!
//! Transport and configuration failures are returned to the caller. Model
//! output that cannot be read as JSON is not an error: the affected fields
//! take their defaults.

use crate::connectors::{ChatMessage, ChatRequest, CompletionConnector, ConnectorError};
use crate::helpers::llm_json::{lenient, parse_or_default, Parsed};
use crate::models::{Sentiment, Severity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ANALYZE_SYSTEM_PROMPT: &str = "You are an AI assistant analyzing customer reviews and complaints for an e-commerce business.
Analyze the sentiment, severity, and category of each review.

Sentiment options: positive, negative, neutral
Severity options: low (minor issue or praise), medium (moderate concern), high (serious problem), critical (urgent issue requiring immediate attention)
Category: A brief 1-2 word category like \"shipping\", \"quality\", \"service\", \"pricing\", etc.

Respond in JSON format with: sentiment, severity, category, and a brief reasoning.";

const REPLY_SYSTEM_PROMPT: &str = "You are a professional customer service representative writing responses to customer reviews and complaints.
Your tone should be:
- Empathetic and understanding
- Professional and courteous
- Solution-oriented
- Personalized to the customer and their specific concern

For positive reviews: Express gratitude and encourage continued engagement
For negative reviews: Acknowledge the issue, apologize sincerely, and offer a concrete solution or next step
For neutral reviews: Thank them for feedback and address any concerns mentioned";

const CLASSIFY_SYSTEM_PROMPT: &str = "You are an AI assistant that classifies incoming emails to determine if they are customer reviews, complaints, or feedback about products/services.

Reviews and complaints typically:
- Mention product quality, shipping, customer service experiences
- Express satisfaction or dissatisfaction with a purchase
- Request refunds, replacements, or support
- Describe specific issues or praise specific features
- Include ratings or evaluations

NOT reviews/complaints:
- Newsletter subscriptions/unsubscriptions
- Marketing emails
- Order confirmations
- Shipping notifications
- Password resets
- Spam or promotional content

Respond in JSON format with: isReviewOrComplaint (boolean), confidence (0-100), reasoning (brief explanation), and suggestedAction (\"import\" or \"ignore\").";

const EMAIL_BODY_LIMIT: usize = 500;
pub const QUICK_REPLY_FALLBACK: &str = "Unable to generate response";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    pub sentiment: Sentiment,
    pub severity: Severity,
    pub category: String,
    pub reasoning: String,
}

impl Default for ReviewAnalysis {
    fn default() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            severity: Severity::Medium,
            category: "general".to_string(),
            reasoning: String::new(),
        }
    }
}

impl ReviewAnalysis {
    /// Stored when the model could not be reached or understood.
    pub fn failed() -> Self {
        Self {
            reasoning: "Failed to analyze review".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    severity: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    reasoning: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<RawAnalysis> for ReviewAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        Self {
            sentiment: non_empty(raw.sentiment)
                .map(|s| Sentiment::parse_lenient(&s))
                .unwrap_or_default(),
            severity: non_empty(raw.severity)
                .map(|s| Severity::parse_lenient(&s))
                .unwrap_or_default(),
            category: non_empty(raw.category).unwrap_or_else(|| "general".to_string()),
            reasoning: non_empty(raw.reasoning).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Import,
    #[default]
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailClassification {
    pub is_review_or_complaint: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub suggested_action: SuggestedAction,
}

impl EmailClassification {
    pub fn failed() -> Self {
        Self {
            is_review_or_complaint: false,
            confidence: 0.0,
            reasoning: "Failed to classify email".to_string(),
            suggested_action: SuggestedAction::Ignore,
        }
    }

    pub fn should_import(&self) -> bool {
        self.is_review_or_complaint || self.suggested_action == SuggestedAction::Import
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    #[serde(default, deserialize_with = "lenient::boolean")]
    is_review_or_complaint: Option<bool>,
    #[serde(default, deserialize_with = "lenient::float")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    suggested_action: Option<String>,
}

impl From<RawClassification> for EmailClassification {
    fn from(raw: RawClassification) -> Self {
        let suggested_action = match non_empty(raw.suggested_action).map(|a| a.to_lowercase()) {
            Some(action) if action == "import" => SuggestedAction::Import,
            _ => SuggestedAction::Ignore,
        };
        Self {
            is_review_or_complaint: raw.is_review_or_complaint.unwrap_or(false),
            confidence: raw.confidence.unwrap_or(0.0),
            reasoning: non_empty(raw.reasoning).unwrap_or_default(),
            suggested_action,
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub struct ReviewAnalyzer {
    completion: Arc<dyn CompletionConnector>,
}

impl ReviewAnalyzer {
    pub fn new(completion: Arc<dyn CompletionConnector>) -> Self {
        Self { completion }
    }

    #[tracing::instrument(name = "Analyze review", skip(self, content))]
    pub async fn analyze(
        &self,
        content: &str,
        customer_name: &str,
        marketplace: &str,
    ) -> Result<ReviewAnalysis, ConnectorError> {
        let user_prompt = format!(
            "Analyze this review from {} on {}:\n\n\"{}\"\n\nProvide your analysis in JSON format.",
            customer_name, marketplace, content
        );
        let request = ChatRequest::new(vec![
            ChatMessage::system(ANALYZE_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .temperature(0.3)
        .max_tokens(500);

        let response = self.completion.complete(request).await?;

        Ok(match parse_or_default::<RawAnalysis>(&response) {
            Parsed::Extracted(raw) => raw.into(),
            Parsed::Defaulted { reason, .. } => {
                tracing::warn!("Failed to parse AI response: {}", reason);
                ReviewAnalysis::failed()
            }
        })
    }

    #[tracing::instrument(name = "Generate review reply", skip(self, content))]
    pub async fn generate_reply(
        &self,
        content: &str,
        customer_name: &str,
        marketplace: &str,
        sentiment: Sentiment,
        severity: Severity,
    ) -> Result<String, ConnectorError> {
        let user_prompt = format!(
            "Write a professional response to this {} review (severity: {}) from {} on {}:\n\n\"{}\"\n\n\
             Write a response that addresses their concern directly and professionally. Keep it concise (2-4 sentences).",
            sentiment, severity, customer_name, marketplace, content
        );
        let request = ChatRequest::new(vec![
            ChatMessage::system(REPLY_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .temperature(0.7)
        .max_tokens(300);

        Ok(self.completion.complete(request).await?.trim().to_string())
    }

    #[tracing::instrument(name = "Classify email", skip(self, body))]
    pub async fn classify_email(
        &self,
        subject: &str,
        body: &str,
        sender_name: &str,
    ) -> Result<EmailClassification, ConnectorError> {
        let user_prompt = format!(
            "Classify this email from {}:\n\nSubject: \"{}\"\nBody: \"{}\"\n\n\
             Is this a customer review or complaint that should be imported into our review management system?",
            sender_name,
            subject,
            truncate_chars(body, EMAIL_BODY_LIMIT)
        );
        let request = ChatRequest::new(vec![
            ChatMessage::system(CLASSIFY_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .temperature(0.2)
        .max_tokens(300);

        let response = self.completion.complete(request).await?;

        Ok(match parse_or_default::<RawClassification>(&response) {
            Parsed::Extracted(raw) => raw.into(),
            Parsed::Defaulted { reason, .. } => {
                tracing::warn!("Failed to parse AI classification response: {}", reason);
                EmailClassification::failed()
            }
        })
    }

    /// One-off reply for text pasted into the UI, not tied to a stored review.
    pub async fn quick_reply(
        &self,
        content: &str,
        sentiment: &str,
        category: &str,
    ) -> Result<String, ConnectorError> {
        let prompt = format!(
            "You are a professional customer service representative. Generate a professional, empathetic response to the following customer review.

Review: {}
Sentiment: {}
Category: {}

Generate a professional response that:
1. Acknowledges the customer's concern
2. Shows empathy and understanding
3. Offers a solution or next steps
4. Maintains a professional and helpful tone
5. Is concise (2-3 paragraphs maximum)

Response:",
            content, sentiment, category
        );

        let reply = self
            .completion
            .complete(ChatRequest::new(vec![ChatMessage::user(prompt)]))
            .await?;
        let reply = reply.trim();

        Ok(if reply.is_empty() {
            QUICK_REPLY_FALLBACK.to_string()
        } else {
            reply.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::openrouter::mock::ScriptedCompletion;

    fn analyzer(responses: Vec<Result<String, ConnectorError>>) -> (ReviewAnalyzer, Arc<ScriptedCompletion>) {
        let completion = Arc::new(ScriptedCompletion::new(responses));
        (ReviewAnalyzer::new(completion.clone()), completion)
    }

    #[tokio::test]
    async fn analysis_reads_json_inside_prose() {
        let (analyzer, completion) = analyzer(vec![Ok(
            "Here is my analysis:\n{\"sentiment\": \"Negative\", \"severity\": \"high\", \"category\": \"shipping\", \"reasoning\": \"late\"}".into(),
        )]);

        let analysis = analyzer.analyze("Box arrived crushed", "Jo", "Amazon").await.unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.severity, Severity::High);
        assert_eq!(analysis.category, "shipping");

        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, Some(0.3));
        assert_eq!(requests[0].max_tokens, Some(500));
        assert!(requests[0].messages[1].content.contains("from Jo on Amazon"));
    }

    #[tokio::test]
    async fn missing_fields_take_field_defaults() {
        let (analyzer, _) = analyzer(vec![Ok("{\"sentiment\": \"positive\", \"category\": \"\"}".into())]);
        let analysis = analyzer.analyze("Love it", "Jo", "Walmart").await.unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.severity, Severity::Medium);
        assert_eq!(analysis.category, "general");
        assert_eq!(analysis.reasoning, "");
    }

    #[tokio::test]
    async fn mistyped_fields_default_individually() {
        let (analyzer, _) = analyzer(vec![
            Ok("{\"sentiment\": 3, \"severity\": \"critical\", \"category\": \"billing\"}".into()),
            Ok("{\"isReviewOrComplaint\": true, \"confidence\": {\"value\": 87}, \"suggestedAction\": \"import\"}".into()),
        ]);

        let analysis = analyzer.analyze("Charged twice", "Jo", "Amazon").await.unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.severity, Severity::Critical);
        assert_eq!(analysis.category, "billing");

        let classification = analyzer.classify_email("Refund", "Charged twice", "Jo").await.unwrap();
        assert!(classification.is_review_or_complaint);
        assert_eq!(classification.confidence, 0.0);
        assert_eq!(classification.suggested_action, SuggestedAction::Import);
    }

    #[tokio::test]
    async fn unreadable_output_gives_failed_analysis() {
        let (analyzer, _) = analyzer(vec![Ok("I think it is fine".into())]);
        let analysis = analyzer.analyze("ok", "Jo", "Shopify").await.unwrap();
        assert_eq!(analysis, ReviewAnalysis::failed());
        assert_eq!(analysis.reasoning, "Failed to analyze review");
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let (analyzer, _) = analyzer(vec![Err(ConnectorError::NotConfigured(
            "OpenRouter API key not configured".into(),
        ))]);
        assert!(matches!(
            analyzer.analyze("ok", "Jo", "Amazon").await,
            Err(ConnectorError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let (analyzer, completion) = analyzer(vec![Ok("  Thank you, Jo!\n".into())]);
        let reply = analyzer
            .generate_reply("Great", "Jo", "Amazon", Sentiment::Positive, Severity::Low)
            .await
            .unwrap();
        assert_eq!(reply, "Thank you, Jo!");
        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, Some(0.7));
        assert!(requests[0].messages[1].content.contains("positive review (severity: low)"));
    }

    #[tokio::test]
    async fn email_body_is_truncated_and_classification_defaults() {
        let (analyzer, completion) = analyzer(vec![
            Ok("{\"isReviewOrComplaint\": true, \"confidence\": 87, \"suggestedAction\": \"import\"}".into()),
            Ok("no idea".into()),
        ]);

        let body = "x".repeat(800);
        let classification = analyzer.classify_email("Broken", &body, "Sam").await.unwrap();
        assert!(classification.is_review_or_complaint);
        assert_eq!(classification.confidence, 87.0);
        assert_eq!(classification.suggested_action, SuggestedAction::Import);
        assert!(classification.should_import());

        let classification = analyzer.classify_email("Newsletter", "hi", "Shop").await.unwrap();
        assert_eq!(classification, EmailClassification::failed());
        assert!(!classification.should_import());

        let requests = completion.requests.lock().unwrap();
        let prompt = &requests[0].messages[1].content;
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[tokio::test]
    async fn quick_reply_falls_back_on_empty_completion() {
        let (analyzer, _) = analyzer(vec![Ok("   ".into())]);
        let reply = analyzer.quick_reply("Meh", "neutral", "general").await.unwrap();
        assert_eq!(reply, QUICK_REPLY_FALLBACK);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
