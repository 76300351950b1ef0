//! Generation Orchestrator - 生成流程编排
//!
//! 一个生成周期分两个阶段：先生成正文，再根据正文给出的插图描述生成图片。
//! 同一时间最多只有一个周期在运行；状态通过 watch 通道对外发布。

mod status;

pub use status::{AppStatus, GenerationSnapshot};

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::error::ApplicationError;
use crate::application::ports::{GenerationEnginePort, GenerationError, HistoryStorePort};
use crate::domain::{ChapterRequest, GenerationResult, HistoryItem};

/// 生成流程编排器
pub struct GenerationOrchestrator {
    engine: Arc<dyn GenerationEnginePort>,
    history: Arc<dyn HistoryStorePort>,
    state: Arc<watch::Sender<GenerationSnapshot>>,
}

impl GenerationOrchestrator {
    pub fn new(engine: Arc<dyn GenerationEnginePort>, history: Arc<dyn HistoryStorePort>) -> Self {
        let (state, _) = watch::channel(GenerationSnapshot::default());
        Self {
            engine,
            history,
            state: Arc::new(state),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅状态快照
    pub fn subscribe(&self) -> watch::Receiver<GenerationSnapshot> {
        self.state.subscribe()
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> GenerationSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> AppStatus {
        self.state.borrow().status
    }

    /// 校验请求并占用生成槽位
    ///
    /// 校验失败或已有周期在运行时返回错误，状态不变，也不会调用生成服务
    pub fn begin(&self, request: ChapterRequest) -> Result<GenerationCycle, ApplicationError> {
        request.validate()?;

        let mut claimed = None;
        self.state.send_if_modified(|snapshot| {
            if !snapshot.status.can_transition_to(AppStatus::WritingText) {
                return false;
            }
            let cycle = snapshot.cycle + 1;
            *snapshot = GenerationSnapshot {
                status: AppStatus::WritingText,
                cycle,
                ..GenerationSnapshot::default()
            };
            claimed = Some(cycle);
            true
        });

        let Some(cycle) = claimed else {
            tracing::info!(status = %self.status(), "Rejected submit while a cycle is running");
            return Err(ApplicationError::Busy);
        };

        tracing::info!(
            cycle = cycle,
            book_title = %request.book_title,
            chapter_name = %request.chapter_name,
            "Generation cycle started"
        );

        Ok(GenerationCycle {
            cycle,
            request,
            engine: self.engine.clone(),
            history: self.history.clone(),
            state: self.state.clone(),
        })
    }

    /// 提交并等待整个周期完成
    pub async fn submit(&self, request: ChapterRequest) -> Result<GenerationResult, ApplicationError> {
        let outcome = self.begin(request)?.run().await?;
        Ok(outcome.item.result().clone())
    }

    /// 将一条历史记录载入当前视图
    pub fn restore(&self, item: &HistoryItem) -> Result<(), ApplicationError> {
        let restored = self.state.send_if_modified(|snapshot| {
            if !snapshot.status.can_transition_to(AppStatus::Completed) {
                return false;
            }
            snapshot.status = AppStatus::Completed;
            snapshot.result = item.result().clone();
            snapshot.error = None;
            snapshot.warning = None;
            snapshot.history_id = Some(item.id());
            true
        });

        if !restored {
            return Err(ApplicationError::Busy);
        }
        tracing::info!(id = %item.id(), title = %item.title(), "Restored history item");
        Ok(())
    }

    /// 修改当前结果的标题
    ///
    /// 只影响当前视图，已保存的历史记录保持不变
    pub fn retitle(&self, title: &str) -> Result<GenerationResult, ApplicationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApplicationError::validation("title must not be empty"));
        }

        let mut outcome = Err(ApplicationError::invalid_state("no chapter to retitle"));
        self.state.send_if_modified(|snapshot| {
            if snapshot.status.is_busy() {
                outcome = Err(ApplicationError::Busy);
                return false;
            }
            match snapshot.result.retitled(title) {
                Some(result) => {
                    snapshot.result = result.clone();
                    outcome = Ok(result);
                    true
                }
                None => false,
            }
        });
        outcome
    }
}

/// 完成的生成周期
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub item: HistoryItem,
    /// 是否已写入历史记录
    pub persisted: bool,
}

/// 已占用槽位的生成周期
///
/// 未走到 Completed / Failed 就被丢弃（任务取消或 panic）时，在 drop 中转为 Failed 并释放槽位
pub struct GenerationCycle {
    cycle: u64,
    request: ChapterRequest,
    engine: Arc<dyn GenerationEnginePort>,
    history: Arc<dyn HistoryStorePort>,
    state: Arc<watch::Sender<GenerationSnapshot>>,
}

impl GenerationCycle {
    pub fn id(&self) -> u64 {
        self.cycle
    }

    /// 依次执行两个阶段，成功后写入历史记录
    ///
    /// 历史记录写入失败不影响 Completed 状态，只在快照中留下 warning
    pub async fn run(self) -> Result<CycleOutcome, ApplicationError> {
        let text = match self.engine.generate_text(&self.request).await {
            Ok(text) => text,
            Err(e) => return Err(self.fail("text", e)),
        };

        tracing::info!(
            cycle = self.cycle,
            title = %text.title(),
            content_len = text.content().len(),
            "Chapter text generated"
        );

        // 先发布只有正文的结果，再进入插图阶段
        let partial = GenerationResult::text_only(text.clone());
        self.update(|snapshot| snapshot.result = partial);
        self.transition(AppStatus::GeneratingImage, |_| {});

        let image = match self
            .engine
            .generate_image(text.image_prompt(), self.request.image_aspect_ratio)
            .await
        {
            Ok(image) => image,
            Err(e) => return Err(self.fail("image", e)),
        };

        let result = GenerationResult::complete(text, image);
        let item = HistoryItem::new(self.request.clone(), result.clone())?;

        let warning = match self.history.add(item.clone()).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    cycle = self.cycle,
                    id = %item.id(),
                    error = %e,
                    "Failed to persist history item"
                );
                Some(format!("The chapter could not be saved to history: {}", e))
            }
        };

        let id = item.id();
        let persisted = warning.is_none();
        self.transition(AppStatus::Completed, |snapshot| {
            snapshot.result = result;
            snapshot.warning = warning;
            snapshot.history_id = persisted.then_some(id);
        });

        tracing::info!(
            cycle = self.cycle,
            id = %id,
            persisted = persisted,
            "Generation cycle completed"
        );
        Ok(CycleOutcome { item, persisted })
    }

    fn fail(&self, phase: &'static str, err: GenerationError) -> ApplicationError {
        tracing::error!(cycle = self.cycle, phase = phase, error = %err, "Generation cycle failed");
        let message = err.to_string();
        self.transition(AppStatus::Failed, |snapshot| snapshot.error = Some(message));
        ApplicationError::from(err)
    }

    fn update(&self, f: impl FnOnce(&mut GenerationSnapshot)) {
        self.state.send_modify(f);
    }

    fn transition(&self, next: AppStatus, f: impl FnOnce(&mut GenerationSnapshot)) {
        let cycle = self.cycle;
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.cycle != cycle || !snapshot.status.can_transition_to(next) {
                return false;
            }
            snapshot.status = next;
            f(snapshot);
            true
        });

        if !applied {
            tracing::error!(cycle = cycle, next = %next, "Rejected invalid status transition");
        }
    }
}

impl Drop for GenerationCycle {
    fn drop(&mut self) {
        let cycle = self.cycle;
        let interrupted = self.state.send_if_modified(|snapshot| {
            if snapshot.cycle != cycle || !snapshot.status.is_busy() {
                return false;
            }
            snapshot.status = AppStatus::Failed;
            snapshot.error = Some("The generation was interrupted".to_string());
            true
        });

        if interrupted {
            tracing::warn!(cycle = cycle, "Generation cycle interrupted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NavigationDirection, PersistenceError};
    use crate::domain::{AspectRatio, ChapterResponse, HistoryId, ImageHandle};
    use crate::infrastructure::adapters::genai::FakeGenAiClient;
    use crate::infrastructure::persistence::sled::{temporary_database, SledHistoryStore};

    fn request() -> ChapterRequest {
        ChapterRequest {
            book_title: "The Salt Road".to_string(),
            genre: "Fantasy".to_string(),
            chapter_name: "The Fall".to_string(),
            plot_summary: "The caravan is ambushed at the pass.".to_string(),
            image_aspect_ratio: AspectRatio::PortraitTall,
            ..ChapterRequest::default()
        }
    }

    /// 每次写入都失败的历史记录存储
    struct FullDiskHistory;

    #[async_trait::async_trait]
    impl HistoryStorePort for FullDiskHistory {
        async fn add(&self, _item: HistoryItem) -> Result<(), PersistenceError> {
            Err(PersistenceError::DatabaseError("disk full".to_string()))
        }

        async fn remove(&self, _id: HistoryId) -> Result<bool, PersistenceError> {
            Err(PersistenceError::DatabaseError("disk full".to_string()))
        }

        async fn list(&self) -> Vec<HistoryItem> {
            vec![]
        }

        async fn get(&self, _id: HistoryId) -> Option<HistoryItem> {
            None
        }
    }

    fn setup() -> (Arc<FakeGenAiClient>, Arc<SledHistoryStore>, GenerationOrchestrator) {
        let engine = FakeGenAiClient::with_defaults().arc();
        let history = SledHistoryStore::new(temporary_database().unwrap()).arc();
        let orchestrator = GenerationOrchestrator::new(engine.clone(), history.clone());
        (engine, history, orchestrator)
    }

    /// 收集 watch 通道中出现过的全部状态
    fn record_statuses(
        mut rx: watch::Receiver<GenerationSnapshot>,
    ) -> tokio::task::JoinHandle<Vec<(AppStatus, bool)>> {
        tokio::spawn(async move {
            let mut seen = vec![];
            loop {
                let (status, has_text) = {
                    let snapshot = rx.borrow_and_update();
                    (snapshot.status, !snapshot.result.is_empty())
                };
                if seen.last() != Some(&(status, has_text)) {
                    seen.push((status, has_text));
                }
                if matches!(status, AppStatus::Completed | AppStatus::Failed) {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
            seen
        })
    }

    #[tokio::test]
    async fn test_happy_path_commits_one_item() {
        let (engine, history, orchestrator) = setup();
        engine.set_latency(std::time::Duration::from_millis(20));
        let watcher = record_statuses(orchestrator.subscribe());
        tokio::task::yield_now().await;

        let result = orchestrator.submit(request()).await.unwrap();
        assert!(result.is_complete());

        let statuses = watcher.await.unwrap();
        assert_eq!(
            statuses,
            vec![
                (AppStatus::Idle, false),
                (AppStatus::WritingText, false),
                (AppStatus::GeneratingImage, true),
                (AppStatus::Completed, true),
            ]
        );

        let items = history.list().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].result(), &result);

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.status, AppStatus::Completed);
        assert_eq!(snapshot.history_id, Some(items[0].id()));
        assert_eq!(snapshot.cycle, 1);
        assert!(snapshot.warning.is_none());
    }

    #[tokio::test]
    async fn test_image_prompt_comes_from_text_phase() {
        let (engine, _history, orchestrator) = setup();
        engine
            .push_text(Ok(ChapterResponse::new("T", "Body", "Notes", "a lighthouse in fog")))
            .await;

        orchestrator.submit(request()).await.unwrap();

        let images = engine.image_calls().await;
        assert_eq!(
            images,
            vec![("a lighthouse in fog".to_string(), AspectRatio::PortraitTall)]
        );
    }

    #[tokio::test]
    async fn test_image_failure_keeps_text_without_commit() {
        let (engine, history, orchestrator) = setup();
        engine
            .push_image(Err(GenerationError::Service("quota exceeded".to_string())))
            .await;

        let err = orchestrator.submit(request()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::GenerationError(_)));

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.status, AppStatus::Failed);
        assert!(snapshot.result.text().is_some());
        assert!(snapshot.result.image().is_none());
        assert!(snapshot.error.unwrap().contains("quota exceeded"));
        assert_eq!(history.len().await, 0);
    }

    #[tokio::test]
    async fn test_text_failure_never_calls_image() {
        let (engine, history, orchestrator) = setup();
        engine.push_text(Err(GenerationError::Timeout)).await;

        assert!(orchestrator.submit(request()).await.is_err());

        assert_eq!(orchestrator.status(), AppStatus::Failed);
        assert!(orchestrator.snapshot().result.is_empty());
        assert!(engine.image_calls().await.is_empty());
        assert_eq!(history.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_any_call() {
        let (engine, _history, orchestrator) = setup();
        let mut invalid = request();
        invalid.plot_summary = "  ".to_string();

        let err = orchestrator.submit(invalid).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(orchestrator.status(), AppStatus::Idle);
        assert_eq!(orchestrator.snapshot().cycle, 0);
        assert!(engine.text_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_while_running_is_rejected() {
        let (engine, history, orchestrator) = setup();

        let cycle = orchestrator.begin(request()).unwrap();
        assert_eq!(orchestrator.status(), AppStatus::WritingText);

        let err = orchestrator.begin(request()).err().unwrap();
        assert!(matches!(err, ApplicationError::Busy));
        assert_eq!(orchestrator.snapshot().cycle, 1);

        cycle.run().await.unwrap();
        assert_eq!(engine.text_calls().await.len(), 1);
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_new_cycle_resets_result() {
        let (_engine, _history, orchestrator) = setup();
        orchestrator.submit(request()).await.unwrap();

        let cycle = orchestrator.begin(request()).unwrap();
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.status, AppStatus::WritingText);
        assert!(snapshot.result.is_empty());
        assert!(snapshot.history_id.is_none());
        assert_eq!(snapshot.cycle, 2);
        cycle.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_and_retitle() {
        let (_engine, history, orchestrator) = setup();
        orchestrator.submit(request()).await.unwrap();
        orchestrator.submit(request()).await.unwrap();

        let items = history.list().await;
        let older = history
            .neighbor(items[0].id(), NavigationDirection::Next)
            .await
            .unwrap();
        orchestrator.restore(&older).unwrap();
        assert_eq!(orchestrator.snapshot().history_id, Some(older.id()));

        let renamed = orchestrator.retitle("  A New Dawn ").unwrap();
        assert_eq!(renamed.text().unwrap().title(), "A New Dawn");
        assert_eq!(orchestrator.snapshot().result, renamed);

        // 历史记录不受影响
        let stored = history.get(older.id()).await.unwrap();
        assert_ne!(stored.title(), "A New Dawn");
    }

    #[tokio::test]
    async fn test_restore_refused_while_busy() {
        let (_engine, history, orchestrator) = setup();
        orchestrator.submit(request()).await.unwrap();
        let item = history.list().await.remove(0);

        let cycle = orchestrator.begin(request()).unwrap();
        assert!(matches!(orchestrator.restore(&item), Err(ApplicationError::Busy)));
        assert!(matches!(orchestrator.retitle("x"), Err(ApplicationError::Busy)));
        cycle.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_retitle_without_result() {
        let (_engine, _history, orchestrator) = setup();
        assert!(matches!(
            orchestrator.retitle("Title"),
            Err(ApplicationError::InvalidState(_))
        ));
        assert!(matches!(
            orchestrator.retitle("   "),
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_persist_failure_completes_with_warning() {
        let engine = FakeGenAiClient::with_defaults().arc();
        let orchestrator = GenerationOrchestrator::new(engine, Arc::new(FullDiskHistory));

        let outcome = orchestrator.begin(request()).unwrap().run().await.unwrap();
        assert!(!outcome.persisted);
        assert!(outcome.item.result().is_complete());

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.status, AppStatus::Completed);
        assert!(snapshot.history_id.is_none());
        assert!(snapshot.warning.unwrap().contains("disk full"));
        assert_eq!(snapshot.result, outcome.item.result().clone());
    }

    #[tokio::test]
    async fn test_successful_cycle_reports_persisted() {
        let (_engine, history, orchestrator) = setup();
        let outcome = orchestrator.begin(request()).unwrap().run().await.unwrap();
        assert!(outcome.persisted);
        assert!(history.get(outcome.item.id()).await.is_some());
    }

    #[tokio::test]
    async fn test_aborted_cycle_releases_slot() {
        let (engine, history, orchestrator) = setup();
        engine.set_latency(std::time::Duration::from_secs(5));

        let cycle = orchestrator.begin(request()).unwrap();
        let task = tokio::spawn(cycle.run());
        tokio::task::yield_now().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.status, AppStatus::Failed);
        assert!(snapshot.error.unwrap().contains("interrupted"));
        assert_eq!(history.len().await, 0);

        engine.set_latency(std::time::Duration::ZERO);
        assert!(orchestrator.submit(request()).await.is_ok());
        assert_eq!(orchestrator.snapshot().cycle, 2);
    }

    #[tokio::test]
    async fn test_dropped_cycle_releases_slot() {
        let (_engine, _history, orchestrator) = setup();
        drop(orchestrator.begin(request()).unwrap());
        assert_eq!(orchestrator.status(), AppStatus::Failed);
        assert!(orchestrator.begin(request()).is_ok());
    }

    #[tokio::test]
    async fn test_remote_image_handles_are_accepted() {
        let (engine, _history, orchestrator) = setup();
        engine
            .push_image(Ok(ImageHandle::new("https://cdn.example.com/art.jpg").unwrap()))
            .await;
        let result = orchestrator.submit(request()).await.unwrap();
        assert_eq!(result.image().unwrap().as_str(), "https://cdn.example.com/art.jpg");
    }
}
