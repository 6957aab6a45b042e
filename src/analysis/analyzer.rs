use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::constants::WARMUP_QUERY;
use crate::pertinence::PertinenceDecider;
use crate::ranking::{CategoryFailure, RankedCategoryResult, RankingOrchestrator, assemble};
use crate::scoring::ScoringError;
use crate::taxonomy::{Category, TaxonomyCache};

use super::error::AnalysisError;
use super::request::{AnalysisRequest, LanguagePolicy};
use super::response::AnalysisResponse;

/// Runs one analysis request end to end.
///
/// The three categories are evaluated as independent tasks and joined before the response
/// is assembled. Every task shares one deadline; a category still running when it passes is
/// cancelled and reported as timed out. Cancelling a task never cancels a taxonomy fetch other
/// requests are waiting on.
#[derive(Debug, Clone)]
pub struct Analyzer {
    cache: TaxonomyCache,
    orchestrator: RankingOrchestrator,
    decider: PertinenceDecider,
    languages: LanguagePolicy,
    request_timeout: Duration,
}

impl Analyzer {
    pub fn new(
        cache: TaxonomyCache,
        orchestrator: RankingOrchestrator,
        decider: PertinenceDecider,
        languages: LanguagePolicy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            orchestrator,
            decider,
            languages,
            request_timeout,
        }
    }

    pub fn cache(&self) -> &TaxonomyCache {
        &self.cache
    }

    pub fn orchestrator(&self) -> &RankingOrchestrator {
        &self.orchestrator
    }

    pub fn languages(&self) -> &LanguagePolicy {
        &self.languages
    }

    #[instrument(skip(self, request), fields(text_len = request.text.len(), language = tracing::field::Empty))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        if request.text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        let language = self.languages.resolve(request.language.as_deref())?;
        tracing::Span::current().record("language", language.as_str());

        let deadline = Instant::now() + self.request_timeout;
        let text: Arc<str> = Arc::from(request.text.as_str());

        let mut tasks = JoinSet::new();
        for category in Category::ALL {
            let cache = self.cache.clone();
            let orchestrator = self.orchestrator.clone();
            let language = language.clone();
            let text = Arc::clone(&text);
            let timeout = self.request_timeout;

            tasks.spawn(async move {
                let ranked = tokio::time::timeout_at(
                    deadline,
                    rank_category(&cache, &orchestrator, &language, category, &text),
                )
                .await
                .unwrap_or_else(|_| {
                    warn!(category = %category, "Category did not finish before the request deadline");
                    RankedCategoryResult::failed(
                        category,
                        CategoryFailure::TimedOut(ScoringError::Timeout { after: timeout }.to_string()),
                    )
                });
                (category, ranked)
            }
            .in_current_span());
        }

        let mut ranked_by_category = Vec::with_capacity(Category::ALL.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => ranked_by_category.push(result),
                Err(e) => warn!(error = %e, "Category task failed"),
            }
        }

        let results = Category::ALL.into_iter().map(|category| {
            let ranked = ranked_by_category
                .iter()
                .position(|(c, _)| *c == category)
                .map(|i| ranked_by_category.swap_remove(i).1)
                .unwrap_or_else(|| {
                    RankedCategoryResult::failed(
                        category,
                        CategoryFailure::Aborted("category task failed".to_string()),
                    )
                });
            let decision = self.decider.decide(&ranked);
            (ranked, decision)
        });

        let response = AnalysisResponse::assemble(request.text.clone(), language, results, &self.decider);

        info!(
            pertinent = response.per_category.values().filter(|o| o.is_pertinent).count(),
            "Analysis complete"
        );
        Ok(response)
    }

    /// Populates the taxonomy cache and runs one scoring pass so the first real request does
    /// not pay for model start-up. Returns the number of usable taxonomy keys.
    pub async fn warm_up(&self) -> usize {
        let ready = self.cache.prefetch(self.languages.supported()).await;

        let language = self
            .languages
            .fallback()
            .or_else(|| self.languages.supported().first().map(String::as_str));
        let Some(language) = language else {
            return ready;
        };

        match self.cache.get(language, Category::Theme).await {
            Ok(lookup) => {
                let pairs = assemble(WARMUP_QUERY, Category::Theme, &lookup.entries);
                let ranked = self.orchestrator.rank(Category::Theme, pairs).await;
                match &ranked.error {
                    Some(e) => warn!(error = %e, "Scorer warm-up failed"),
                    None => debug!(candidates = ranked.candidates.len(), "Scorer warmed up"),
                }
            }
            Err(e) => warn!(error = %e, "Skipping scorer warm-up, theme taxonomy unavailable"),
        }

        info!(keys = ready, "Warm-up complete");
        ready
    }
}

/// Loads one category's taxonomy and ranks it. Failures end up on the result.
async fn rank_category(
    cache: &TaxonomyCache,
    orchestrator: &RankingOrchestrator,
    language: &str,
    category: Category,
    text: &str,
) -> RankedCategoryResult {
    let lookup = match cache.get(language, category).await {
        Ok(lookup) => lookup,
        Err(e) => {
            warn!(category = %category, error = %e, "Taxonomy unavailable");
            return RankedCategoryResult::failed(
                category,
                CategoryFailure::TaxonomyUnavailable(e.to_string()),
            );
        }
    };

    let pairs = assemble(text, category, &lookup.entries);
    orchestrator
        .rank(category, pairs)
        .await
        .with_stale(lookup.stale)
}
