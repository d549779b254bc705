use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entity::import_job::ImportStatus;
use crate::domain::entity::product::ProductRecord;
use crate::domain::entity::progress::ProgressSnapshot;
use crate::domain::repository::{ImportJobRepository, ProductRepository, ProgressStore};
use crate::error::ImporterError;

/// 進捗の発行間引き: チャンク境界のうち5回に1回だけ発行する
/// （最終チャンクは必ず発行）。
const PROGRESS_PUBLISH_STRIDE: usize = 5;

/// ジョブの TTL 上限（2時間）。進捗 TTL はこれを超えない。
pub const JOB_TTL_CEILING_SECONDS: u64 = 7200;

/// CSV ヘッダ行から解決した列インデックス。
/// ヘッダ名の照合は大文字小文字を区別せず、未知の列は無視する。
#[derive(Debug, Clone, Copy)]
pub struct CsvColumns {
    pub name: usize,
    pub sku: usize,
    pub description: Option<usize>,
}

/// ヘッダ行を検証して列マッピングを返す。name / sku が必須。
pub fn csv_columns(content: &str) -> Result<CsvColumns, ImporterError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ImporterError::InvalidInput(format!("unparseable CSV: {}", e)))?
        .clone();

    let mut name = None;
    let mut sku = None;
    let mut description = None;
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        if header.eq_ignore_ascii_case("name") {
            name.get_or_insert(idx);
        } else if header.eq_ignore_ascii_case("sku") {
            sku.get_or_insert(idx);
        } else if header.eq_ignore_ascii_case("description") {
            description.get_or_insert(idx);
        }
    }

    match (name, sku) {
        (Some(name), Some(sku)) => Ok(CsvColumns {
            name,
            sku,
            description,
        }),
        _ => {
            let mut missing = Vec::new();
            if name.is_none() {
                missing.push("name");
            }
            if sku.is_none() {
                missing.push("sku");
            }
            Err(ImporterError::InvalidInput(format!(
                "missing required headers: {}",
                missing.join(", ")
            )))
        }
    }
}

fn read_rows(content: &str) -> Result<Vec<csv::StringRecord>, ImporterError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| ImporterError::InvalidInput(format!("unparseable CSV: {}", e)))?;
        rows.push(record);
    }
    Ok(rows)
}

/// チャンク内の行を検証・正規化し、SKU で重複排除したバッチを返す。
/// 同一チャンク内の重複は先勝ち: 後続の重複行はマージせず捨てる。
fn dedupe_chunk(chunk: &[csv::StringRecord], columns: &CsvColumns) -> Vec<ProductRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut batch = Vec::new();
    for row in chunk {
        let name = row.get(columns.name).unwrap_or("");
        let sku = row.get(columns.sku).unwrap_or("");
        let description = columns
            .description
            .and_then(|idx| row.get(idx))
            .unwrap_or("");
        if let Some(record) = ProductRecord::from_row(name, sku, description) {
            if seen.insert(record.sku.clone()) {
                batch.push(record);
            }
        }
    }
    batch
}

/// ImportRunner は1件のアップロードを最後まで駆動するオーケストレータ。
///
/// リクエストスレッドとは独立した背景タスクとして動き、チャンク単位で
///   キャンセル確認 → 検証・重複排除 → アトミック upsert → 進捗発行 →
///   一覧キャッシュ破棄 → スケジューラへの譲歩
/// を繰り返す。チャンク内の書き込みだけがアトミックで、失敗時に
/// コミット済みチャンクは巻き戻さない。
pub struct ImportRunner {
    product_repo: Arc<dyn ProductRepository>,
    job_repo: Arc<dyn ImportJobRepository>,
    progress: Arc<dyn ProgressStore>,
    chunk_size: usize,
    progress_ttl_seconds: u64,
}

impl ImportRunner {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        job_repo: Arc<dyn ImportJobRepository>,
        progress: Arc<dyn ProgressStore>,
        chunk_size: usize,
        progress_ttl_seconds: u64,
    ) -> Self {
        Self {
            product_repo,
            job_repo,
            progress,
            chunk_size: chunk_size.max(1),
            progress_ttl_seconds: progress_ttl_seconds.min(JOB_TTL_CEILING_SECONDS),
        }
    }

    /// ジョブを最後まで実行する。エラーは FAILURE 終端状態として
    /// 吸収されるため戻り値はない。呼び出し側は `tokio::spawn` で包む。
    pub async fn run(&self, job_id: Uuid, content: String) {
        if let Err(e) = self.process(job_id, &content).await {
            self.fail_job(job_id, &e).await;
        }
    }

    async fn process(&self, job_id: Uuid, content: &str) -> Result<(), ImporterError> {
        let columns = csv_columns(content)?;
        let rows = read_rows(content)?;
        if rows.is_empty() {
            return Err(ImporterError::InvalidInput(
                "CSV file contains no data rows".to_string(),
            ));
        }
        let total = rows.len() as i64;

        let mut job = self
            .job_repo
            .find_by_id(&job_id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", job_id)))?;
        job.status = ImportStatus::Progress;
        job.total_records = total;
        self.job_repo.update(&job).await?;
        self.publish(&job_id, &ProgressSnapshot::running(0, total, 0)).await;

        let mut imported: i64 = 0;
        let chunk_count = rows.len().div_ceil(self.chunk_size);

        for (chunk_index, chunk) in rows.chunks(self.chunk_size).enumerate() {
            let chunk_start = chunk_index * self.chunk_size;

            // キャンセルはチャンク境界でのみ観測する（協調的・最大1チャンク遅延）
            if self.cancel_requested(&job_id).await {
                job.status = ImportStatus::Cancelled;
                job.records_processed = imported;
                self.job_repo.update(&job).await?;
                self.publish(
                    &job_id,
                    &ProgressSnapshot::cancelled(chunk_start as i64, total, imported),
                )
                .await;
                info!(job_id = %job_id, imported, "import cancelled");
                return Ok(());
            }

            let batch = dedupe_chunk(chunk, &columns);
            if !batch.is_empty() {
                self.product_repo.upsert_batch(&batch).await?;
            }
            imported += batch.len() as i64;

            let chunk_end = (chunk_start + chunk.len()) as i64;
            let is_last = chunk_index + 1 == chunk_count;
            if chunk_start % (PROGRESS_PUBLISH_STRIDE * self.chunk_size) == 0 || is_last {
                job.records_processed = imported;
                self.job_repo.update(&job).await?;
                self.publish(
                    &job_id,
                    &ProgressSnapshot::running(chunk_end, total, imported),
                )
                .await;
            }

            self.invalidate_listings().await;
            tokio::task::yield_now().await;
        }

        job.status = ImportStatus::Success;
        job.records_processed = imported;
        self.job_repo.update(&job).await?;
        self.publish(&job_id, &ProgressSnapshot::success(total, imported)).await;
        info!(job_id = %job_id, imported, total, "import completed");
        Ok(())
    }

    async fn fail_job(&self, job_id: Uuid, err: &ImporterError) {
        error!(job_id = %job_id, error = %err, "import failed");
        match self.job_repo.find_by_id(&job_id).await {
            Ok(Some(mut job)) => {
                job.status = ImportStatus::Failure;
                job.error = Some(err.to_string());
                if let Err(e) = self.job_repo.update(&job).await {
                    error!(job_id = %job_id, error = %e, "failed to persist FAILURE state");
                }
            }
            Ok(None) => error!(job_id = %job_id, "job row missing while marking FAILURE"),
            Err(e) => error!(job_id = %job_id, error = %e, "failed to load job for FAILURE"),
        }
        self.publish(&job_id, &ProgressSnapshot::failure(&err.to_string()))
            .await;
    }

    // --- キャッシュ層はすべてベストエフォート ---

    async fn publish(&self, job_id: &Uuid, snapshot: &ProgressSnapshot) {
        if let Err(e) = self
            .progress
            .publish(job_id, snapshot, self.progress_ttl_seconds)
            .await
        {
            warn!(job_id = %job_id, error = %e, "progress publish failed, continuing");
        }
    }

    async fn cancel_requested(&self, job_id: &Uuid) -> bool {
        match self.progress.is_cancel_requested(job_id).await {
            Ok(requested) => requested,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "cancel marker check failed, assuming not cancelled");
                false
            }
        }
    }

    async fn invalidate_listings(&self) {
        if let Err(e) = self.progress.invalidate_listings().await {
            warn!(error = %e, "listing cache invalidation failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::entity::import_job::ImportJob;
    use crate::domain::entity::product::{NewProduct, Product};
    use crate::domain::repository::product_repository::ProductFilter;

    // --- インメモリフェイク ---

    #[derive(Default)]
    struct FakeProductRepo {
        products: Mutex<HashMap<String, Product>>,
        batches: Mutex<Vec<usize>>,
        fail_after_batches: Option<usize>,
    }

    impl FakeProductRepo {
        fn failing_after(n: usize) -> Self {
            Self {
                fail_after_batches: Some(n),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ProductRepository for FakeProductRepo {
        async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ImporterError> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .values()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ImporterError> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .get(&sku.to_uppercase())
                .cloned())
        }

        async fn find_all(&self, _filter: &ProductFilter) -> Result<Vec<Product>, ImporterError> {
            Ok(self.products.lock().unwrap().values().cloned().collect())
        }

        async fn count(&self, _filter: &ProductFilter) -> Result<i64, ImporterError> {
            Ok(self.products.lock().unwrap().len() as i64)
        }

        async fn create(&self, _product: &NewProduct) -> Result<Product, ImporterError> {
            unimplemented!("not used by the runner")
        }

        async fn update(&self, _product: &Product) -> Result<Product, ImporterError> {
            unimplemented!("not used by the runner")
        }

        async fn delete(&self, _id: i64) -> Result<bool, ImporterError> {
            unimplemented!("not used by the runner")
        }

        async fn delete_all(&self) -> Result<i64, ImporterError> {
            unimplemented!("not used by the runner")
        }

        async fn upsert_batch(&self, records: &[ProductRecord]) -> Result<(), ImporterError> {
            {
                let mut batches = self.batches.lock().unwrap();
                if let Some(limit) = self.fail_after_batches {
                    if batches.len() >= limit {
                        return Err(ImporterError::Internal("db connection lost".to_string()));
                    }
                }
                batches.push(records.len());
            }
            let mut products = self.products.lock().unwrap();
            let now = chrono::Utc::now();
            for r in records {
                let next_id = products.len() as i64 + 1;
                products
                    .entry(r.sku.clone())
                    .and_modify(|p| {
                        p.name = r.name.clone();
                        p.description = r.description.clone();
                        p.updated_at = Some(now);
                    })
                    .or_insert_with(|| Product {
                        id: next_id,
                        name: r.name.clone(),
                        sku: r.sku.clone(),
                        description: r.description.clone(),
                        active: true,
                        created_at: now,
                        updated_at: None,
                    });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeJobRepo {
        jobs: Mutex<HashMap<Uuid, ImportJob>>,
        processed_history: Mutex<Vec<i64>>,
    }

    impl FakeJobRepo {
        fn seed(&self, job: &ImportJob) {
            self.jobs.lock().unwrap().insert(job.id, job.clone());
        }

        fn get(&self, id: &Uuid) -> ImportJob {
            self.jobs.lock().unwrap().get(id).unwrap().clone()
        }
    }

    #[async_trait]
    impl ImportJobRepository for FakeJobRepo {
        async fn create(&self, job: &ImportJob) -> Result<(), ImporterError> {
            self.jobs.lock().unwrap().insert(job.id, job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &Uuid) -> Result<Option<ImportJob>, ImporterError> {
            Ok(self.jobs.lock().unwrap().get(id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<ImportJob>, ImporterError> {
            Ok(self.jobs.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, job: &ImportJob) -> Result<(), ImporterError> {
            self.processed_history
                .lock()
                .unwrap()
                .push(job.records_processed);
            let mut jobs = self.jobs.lock().unwrap();
            let active = jobs.get(&job.id).map(|j| j.active).unwrap_or(job.active);
            let mut stored = job.clone();
            stored.active = active;
            jobs.insert(job.id, stored);
            Ok(())
        }

        async fn set_active(&self, id: &Uuid, active: bool) -> Result<(), ImporterError> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .get_mut(id)
                .ok_or_else(|| ImporterError::NotFound(format!("import job {}", id)))?;
            job.active = active;
            Ok(())
        }

        async fn delete(&self, id: &Uuid) -> Result<bool, ImporterError> {
            Ok(self.jobs.lock().unwrap().remove(id).is_some())
        }
    }

    #[derive(Default)]
    struct FakeProgressStore {
        snapshots: Mutex<Vec<ProgressSnapshot>>,
        cancel_at_publish: Mutex<Option<usize>>,
        cancelled: Mutex<bool>,
        invalidations: Mutex<usize>,
    }

    impl FakeProgressStore {
        /// n 回目の publish 後にキャンセルマーカーを立てる。
        fn cancel_after_publishes(n: usize) -> Self {
            Self {
                cancel_at_publish: Mutex::new(Some(n)),
                ..Self::default()
            }
        }

        fn last_snapshot(&self) -> ProgressSnapshot {
            self.snapshots.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressStore for FakeProgressStore {
        async fn publish(
            &self,
            _job_id: &Uuid,
            snapshot: &ProgressSnapshot,
            _ttl_seconds: u64,
        ) -> Result<(), ImporterError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            snapshots.push(snapshot.clone());
            if let Some(n) = *self.cancel_at_publish.lock().unwrap() {
                if snapshots.len() >= n {
                    *self.cancelled.lock().unwrap() = true;
                }
            }
            Ok(())
        }

        async fn read(&self, _job_id: &Uuid) -> Result<Option<ProgressSnapshot>, ImporterError> {
            Ok(self.snapshots.lock().unwrap().last().cloned())
        }

        async fn request_cancel(
            &self,
            _job_id: &Uuid,
            _ttl_seconds: u64,
        ) -> Result<(), ImporterError> {
            *self.cancelled.lock().unwrap() = true;
            Ok(())
        }

        async fn is_cancel_requested(&self, _job_id: &Uuid) -> Result<bool, ImporterError> {
            Ok(*self.cancelled.lock().unwrap())
        }

        async fn cache_listing(
            &self,
            _key: &str,
            _payload: &serde_json::Value,
            _ttl_seconds: u64,
        ) -> Result<(), ImporterError> {
            Ok(())
        }

        async fn read_listing(
            &self,
            _key: &str,
        ) -> Result<Option<serde_json::Value>, ImporterError> {
            Ok(None)
        }

        async fn invalidate_listings(&self) -> Result<(), ImporterError> {
            *self.invalidations.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn make_csv(rows: &[(&str, &str, &str)]) -> String {
        let mut out = String::from("name,sku,description\n");
        for (name, sku, desc) in rows {
            out.push_str(&format!("{},{},{}\n", name, sku, desc));
        }
        out
    }

    fn runner(
        products: Arc<FakeProductRepo>,
        jobs: Arc<FakeJobRepo>,
        progress: Arc<FakeProgressStore>,
        chunk_size: usize,
    ) -> ImportRunner {
        ImportRunner::new(products, jobs, progress, chunk_size, 3600)
    }

    // --- ヘッダ検証 ---

    #[test]
    fn test_csv_columns_case_insensitive() {
        let cols = csv_columns("Name,SKU,Description\na,b,c\n").unwrap();
        assert_eq!(cols.name, 0);
        assert_eq!(cols.sku, 1);
        assert_eq!(cols.description, Some(2));
    }

    #[test]
    fn test_csv_columns_description_optional_unknown_ignored() {
        let cols = csv_columns("sku,price,name\nA,1,B\n").unwrap();
        assert_eq!(cols.sku, 0);
        assert_eq!(cols.name, 2);
        assert!(cols.description.is_none());
    }

    #[test]
    fn test_csv_columns_missing_sku() {
        let err = csv_columns("name,description\na,b\n").unwrap_err();
        assert!(matches!(err, ImporterError::InvalidInput(_)));
        assert!(err.to_string().contains("sku"));
    }

    #[test]
    fn test_csv_columns_empty_content() {
        let err = csv_columns("").unwrap_err();
        assert!(matches!(err, ImporterError::InvalidInput(_)));
    }

    // --- 重複排除 ---

    #[test]
    fn test_dedupe_first_occurrence_wins() {
        let rows = read_rows("name,sku\nX,A\nY,a\n").unwrap();
        let cols = csv_columns("name,sku\nX,A\n").unwrap();
        let batch = dedupe_chunk(&rows, &cols);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].sku, "A");
        assert_eq!(batch[0].name, "X");
    }

    #[test]
    fn test_dedupe_drops_invalid_rows() {
        let rows = read_rows("name,sku\nX,A\n,B\nY,\n").unwrap();
        let cols = csv_columns("name,sku\nX,A\n").unwrap();
        let batch = dedupe_chunk(&rows, &cols);
        assert_eq!(batch.len(), 1);
    }

    // --- オーケストレータのシナリオ ---

    #[tokio::test]
    async fn success_2500_rows_in_3_chunks() {
        let rows: Vec<(String, String, String)> = (0..2500)
            .map(|i| (format!("Product {}", i), format!("SKU-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("products.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job.id, csv)
            .await;

        let final_job = jobs.get(&job.id);
        assert_eq!(final_job.status, ImportStatus::Success);
        assert_eq!(final_job.total_records, 2500);
        assert_eq!(final_job.records_processed, 2500);
        assert_eq!(*products.batches.lock().unwrap(), vec![1000, 1000, 500]);

        let last = progress.last_snapshot();
        assert_eq!(last.state, "SUCCESS");
        assert_eq!(last.imported_count, Some(2500));
        assert_eq!(last.progress_percent, 100);
    }

    #[tokio::test]
    async fn invalid_rows_counted_in_total_but_not_imported() {
        // 10行中1行（空 sku）は捨てられる
        let mut rows: Vec<(String, String, String)> = (0..9)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        rows.insert(4, ("NoSku".to_string(), "".to_string(), String::new()));
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job.id, csv)
            .await;

        let final_job = jobs.get(&job.id);
        assert_eq!(final_job.status, ImportStatus::Success);
        assert_eq!(final_job.total_records, 10);
        assert_eq!(final_job.records_processed, 9);
        assert_eq!(products.products.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn intra_chunk_duplicates_first_wins() {
        let csv = make_csv(&[("X", "A", ""), ("Y", "a", ""), ("Z", "B", "")]);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job.id, csv)
            .await;

        let stored = products.products.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.get("A").unwrap().name, "X");
        assert_eq!(jobs.get(&job.id).records_processed, 2);
    }

    #[tokio::test]
    async fn reimport_is_idempotent_and_updates_fields() {
        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());

        let first = make_csv(&[("Old name", "A", "old")]);
        let job1 = ImportJob::new("one.csv".to_string());
        jobs.seed(&job1);
        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job1.id, first)
            .await;
        let id_before = products.products.lock().unwrap().get("A").unwrap().id;

        let second = make_csv(&[("New name", "a", "new")]);
        let job2 = ImportJob::new("two.csv".to_string());
        jobs.seed(&job2);
        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job2.id, second)
            .await;

        let stored = products.products.lock().unwrap();
        assert_eq!(stored.len(), 1);
        let p = stored.get("A").unwrap();
        assert_eq!(p.name, "New name");
        assert_eq!(p.description, "new");
        assert_eq!(p.id, id_before);
        assert!(p.active);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_chunk() {
        // 5チャンク分。チャンク0の進捗発行直後にマーカーが立つので
        // チャンク0は完了し、チャンク1以降は実行されない。
        let rows: Vec<(String, String, String)> = (0..50)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::cancel_after_publishes(2));
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 10)
            .run(job.id, csv)
            .await;

        let final_job = jobs.get(&job.id);
        assert_eq!(final_job.status, ImportStatus::Cancelled);
        // チャンク0のみコミット済み
        assert_eq!(*products.batches.lock().unwrap(), vec![10]);
        assert_eq!(final_job.records_processed, 10);
        assert_eq!(progress.last_snapshot().state, "CANCELLED");
    }

    #[tokio::test]
    async fn write_error_fails_job_keeps_prior_chunks() {
        let rows: Vec<(String, String, String)> = (0..30)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::failing_after(2));
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 10)
            .run(job.id, csv)
            .await;

        let final_job = jobs.get(&job.id);
        assert_eq!(final_job.status, ImportStatus::Failure);
        assert!(final_job.error.as_deref().unwrap().contains("db connection lost"));
        // 先行2チャンクはコミットされたまま
        assert_eq!(products.products.lock().unwrap().len(), 20);
        let last = progress.last_snapshot();
        assert_eq!(last.state, "FAILURE");
        assert!(last.error.is_some());
    }

    #[tokio::test]
    async fn empty_file_fails_with_validation_error() {
        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 1000)
            .run(job.id, "name,sku,description\n".to_string())
            .await;

        let final_job = jobs.get(&job.id);
        assert_eq!(final_job.status, ImportStatus::Failure);
        assert!(final_job.error.as_deref().unwrap().contains("no data rows"));
    }

    #[tokio::test]
    async fn processed_counter_is_monotone() {
        let rows: Vec<(String, String, String)> = (0..120)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products.clone(), jobs.clone(), progress.clone(), 10)
            .run(job.id, csv)
            .await;

        let history = jobs.processed_history.lock().unwrap().clone();
        assert!(history.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*history.last().unwrap(), 120);
    }

    #[tokio::test]
    async fn progress_publishes_only_on_stride_and_final_chunks() {
        // 120行・チャンク10 → 12チャンク。発行されるのは
        // 初期化1回 + ストライド境界（チャンク0,5,10）+ 最終チャンク11
        // + SUCCESS 終端の計6回で、毎チャンクではない。
        let rows: Vec<(String, String, String)> = (0..120)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products, jobs, progress.clone(), 10)
            .run(job.id, csv)
            .await;

        let snapshots = progress.snapshots.lock().unwrap().clone();
        assert_eq!(snapshots.len(), 6);
        let currents: Vec<i64> = snapshots.iter().map(|s| s.current).collect();
        assert_eq!(currents, vec![0, 10, 60, 110, 120, 120]);
        assert_eq!(snapshots.last().unwrap().state, "SUCCESS");
    }

    #[tokio::test]
    async fn listing_cache_invalidated_per_chunk() {
        let rows: Vec<(String, String, String)> = (0..30)
            .map(|i| (format!("P{}", i), format!("S-{}", i), String::new()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.as_str(), d.as_str()))
            .collect();
        let csv = make_csv(&refs);

        let products = Arc::new(FakeProductRepo::default());
        let jobs = Arc::new(FakeJobRepo::default());
        let progress = Arc::new(FakeProgressStore::default());
        let job = ImportJob::new("p.csv".to_string());
        jobs.seed(&job);

        runner(products, jobs, progress.clone(), 10)
            .run(job.id, csv)
            .await;

        assert_eq!(*progress.invalidations.lock().unwrap(), 3);
    }
}
