//! AI-assisted categorization, insights and chat

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::ai::{
    categorization_prompt, chat_prompt, insights_prompt, parse_categorizations, parse_insights,
    ChatMessage, LlmClient,
};
use crate::config::Settings;
use crate::error::SpendwiseResult;
use crate::knowledge::KnowledgeDocument;
use crate::models::{Alert, Categorization, CategorizationSource};
use crate::services::AlertService;
use crate::storage::Storage;

/// Outcome of an AI categorization run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiCategorizationSummary {
    pub examined: usize,
    pub categorized: usize,
    pub left_uncategorized: usize,
    pub failed_batches: usize,
    /// One message per failed batch
    pub errors: Vec<String>,
}

/// Service for AI features
pub struct AiService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
    client: &'a dyn LlmClient,
}

impl<'a> AiService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings, client: &'a dyn LlmClient) -> Self {
        Self {
            storage,
            settings,
            client,
        }
    }

    /// Ask the model to categorize uncategorized transactions
    ///
    /// Works in batches of `ai.max_batch`. A failed batch is recorded and
    /// the run continues with the next one.
    pub fn categorize_uncategorized(&self, limit: Option<usize>) -> SpendwiseResult<AiCategorizationSummary> {
        let mut pending = self.storage.transactions.get_uncategorized()?;
        if let Some(limit) = limit {
            pending.truncate(limit);
        }
        let allowed = self.storage.categories.labels()?;
        let mut summary = AiCategorizationSummary {
            examined: pending.len(),
            ..Default::default()
        };

        for (batch_no, batch) in pending.chunks(self.settings.ai.max_batch.max(1)).enumerate() {
            let request = categorization_prompt(batch, &allowed);
            let parsed = self
                .client
                .complete(&request)
                .and_then(|reply| parse_categorizations(&reply, batch.len(), &allowed));

            let results = match parsed {
                Ok(results) => results,
                Err(e) => {
                    warn!(batch = batch_no + 1, error = %e, "AI categorization batch failed");
                    summary.failed_batches += 1;
                    summary.errors.push(format!("batch {}: {}", batch_no + 1, e));
                    continue;
                }
            };

            for result in results.into_iter().filter(|r| r.is_categorized()) {
                let mut txn = batch[result.index - 1].clone();
                txn.set_category(
                    result.category,
                    Categorization {
                        source: CategorizationSource::Ai,
                        confidence: result.confidence,
                        rule: None,
                    },
                );
                self.storage.transactions.upsert(txn)?;
                summary.categorized += 1;
            }
        }

        self.storage.transactions.save()?;
        summary.left_uncategorized = summary.examined - summary.categorized;
        info!(
            examined = summary.examined,
            categorized = summary.categorized,
            failed_batches = summary.failed_batches,
            "AI categorization finished"
        );
        Ok(summary)
    }

    /// Compile and save the knowledge document
    pub fn refresh_knowledge(&self, as_of: NaiveDate) -> SpendwiseResult<KnowledgeDocument> {
        let document = KnowledgeDocument::compile(self.storage, self.settings, as_of)?;
        document.save(self.storage.paths())?;
        Ok(document)
    }

    /// Generate insights from a fresh knowledge document and store them as
    /// alerts
    pub fn generate_insights(&self, as_of: NaiveDate) -> SpendwiseResult<Vec<Alert>> {
        let document = self.refresh_knowledge(as_of)?;
        let reply = self.client.complete(&insights_prompt(&document.to_json()?))?;
        let alerts: Vec<Alert> = parse_insights(&reply)?
            .into_iter()
            .map(|insight| insight.into_alert())
            .collect();

        AlertService::new(self.storage).add(alerts.clone())?;
        info!(insights = alerts.len(), "stored AI insights");
        Ok(alerts)
    }

    /// Answer a question, streaming the reply through `on_delta`
    ///
    /// Uses the saved knowledge document, compiling one when none exists.
    pub fn chat(
        &self,
        question: &str,
        history: &[ChatMessage],
        as_of: NaiveDate,
        on_delta: &mut dyn FnMut(&str),
    ) -> SpendwiseResult<String> {
        let document = match KnowledgeDocument::load(self.storage.paths())? {
            Some(document) => document,
            None => self.refresh_knowledge(as_of)?,
        };
        let request = chat_prompt(&document, &document.to_json()?, history, question);
        self.client.stream(&request, on_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatRequest;
    use crate::config::SpendwisePaths;
    use crate::error::SpendwiseError;
    use crate::models::{AlertKind, Money, Severity, Transaction};
    use crate::storage::initialize_storage;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Replays canned replies in order and records requests
    struct FakeClient {
        replies: RefCell<Vec<SpendwiseResult<String>>>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl FakeClient {
        fn new(replies: Vec<SpendwiseResult<String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn next(&self, request: &ChatRequest) -> SpendwiseResult<String> {
            self.requests.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(SpendwiseError::Ai("no more replies".into())))
        }
    }

    impl LlmClient for FakeClient {
        fn complete(&self, request: &ChatRequest) -> SpendwiseResult<String> {
            self.next(request)
        }

        fn stream(
            &self,
            request: &ChatRequest,
            on_delta: &mut dyn FnMut(&str),
        ) -> SpendwiseResult<String> {
            let reply = self.next(request)?;
            for word in reply.split_inclusive(' ') {
                on_delta(word);
            }
            Ok(reply)
        }
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, day: u32, description: &str) {
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            description,
            Money::from_cents(-1000),
            "USD",
        );
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_categorize_in_batches_and_survive_failures() {
        let (_dir, storage) = create_test_storage();
        for day in 1..=3 {
            add(&storage, day, &format!("MYSTERY SHOP {}", day));
        }
        let mut settings = Settings::default();
        settings.ai.max_batch = 2;
        let client = FakeClient::new(vec![
            Ok(r#"[{"index":1,"category":"Shopping","confidence":0.7},
                   {"index":2,"category":"Nonsense","confidence":0.9}]"#
                .to_string()),
            Err(SpendwiseError::Ai("timeout".into())),
        ]);

        let service = AiService::new(&storage, &settings, &client);
        let summary = service.categorize_uncategorized(None).unwrap();

        assert_eq!(summary.examined, 3);
        assert_eq!(summary.categorized, 1);
        assert_eq!(summary.left_uncategorized, 2);
        assert_eq!(summary.failed_batches, 1);
        assert!(summary.errors[0].contains("timeout"));
        assert_eq!(client.requests.borrow().len(), 2);

        let categorized: Vec<_> = storage
            .transactions
            .get_all()
            .unwrap()
            .into_iter()
            .filter(|t| t.is_categorized())
            .collect();
        assert_eq!(categorized.len(), 1);
        let how = categorized[0].categorization.as_ref().unwrap();
        assert_eq!(how.source, CategorizationSource::Ai);
        assert_eq!(how.confidence, 0.7);
    }

    #[test]
    fn test_insights_become_alerts() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let client = FakeClient::new(vec![Ok(
            "Here are my findings:\n```json\n[{\"title\":\"Low savings\",\"message\":\"You saved 2%\",\"severity\":\"critical\"}]\n```"
                .to_string(),
        )]);

        let service = AiService::new(&storage, &settings, &client);
        let as_of = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let alerts = service.generate_insights(as_of).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Insight);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(AlertService::new(&storage).list(false).unwrap().len(), 1);
        assert!(storage.paths().knowledge_file().exists());
        assert!(client.requests.borrow()[0].messages[1]
            .content
            .contains("\"base_currency\""));
    }

    #[test]
    fn test_chat_streams_reply() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let client = FakeClient::new(vec![Ok("You spent 10.00 on shopping".to_string())]);
        let service = AiService::new(&storage, &settings, &client);

        let mut streamed = String::new();
        let reply = service
            .chat(
                "What did I spend?",
                &[],
                NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
                &mut |delta| streamed.push_str(delta),
            )
            .unwrap();

        assert_eq!(reply, "You spent 10.00 on shopping");
        assert_eq!(streamed, reply);
        let request = &client.requests.borrow()[0];
        assert_eq!(request.messages.last().unwrap().content, "What did I spend?");
    }
}
