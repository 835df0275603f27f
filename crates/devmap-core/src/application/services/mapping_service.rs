//! Mapping Service - batch orchestrator.
//!
//! This service coordinates one synthesis run per PLC:
//! 1. Resolve and validate the PLC's offset table (fatal if broken)
//! 2. Load and type raw step/timer records (bad records are reported)
//! 3. Hand out step-local sequence numbers
//! 4. Synthesize on scoped worker threads, routing per-record failures
//!    into an [`ErrorAggregator`]
//! 5. Optionally flag address collisions
//! 6. Persist the successful mappings

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::thread;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        aggregator::{ErrorAggregator, ErrorSnapshot},
        ports::{DefinitionRepository, MappingRepository, OffsetProvider, STEPS, TIMERS},
    },
    domain::{
        AddressSynthesizer, CategoryPolicy, Classification, DeviceMappingRecord, DomainError,
        DomainValidator, MappingDiff, OutputError, PlcId, PlcOffsetSet, ProcessStep,
        ProcessStepContext, Severity, StepId, StepTimer, TimerDefinition, diff_mappings,
        raw_record_id,
    },
    error::DevmapResult,
};

/// Knobs for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Upper bound on synthesis threads; clamped to at least one.
    pub workers: usize,
    /// Report duplicated addresses as warnings.
    pub check_collisions: bool,
    /// Synthesize and report, but do not persist.
    pub dry_run: bool,
    pub policy: CategoryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            check_collisions: true,
            dry_run: false,
            policy: CategoryPolicy::default(),
        }
    }
}

/// Outcome of one PLC's batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub plc_id: PlcId,
    pub records: Vec<DeviceMappingRecord>,
    pub errors: ErrorSnapshot,
    /// Records written to the mapping repository (0 on dry runs).
    pub persisted: usize,
}

impl BatchReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// No errors; warnings are allowed.
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.errors.iter().filter(|e| e.severity() == severity).count()
    }
}

/// Outcome of comparing stored mappings with a fresh synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub plc_id: PlcId,
    pub diff: MappingDiff,
    pub errors: ErrorSnapshot,
}

/// One unit of synthesis work.
#[derive(Debug, Clone)]
struct WorkItem {
    step: ProcessStepContext,
    sequence: u32,
    timer: TimerDefinition,
}

/// Batch orchestrator.
///
/// Owns the ports; every run gets its own [`ErrorAggregator`].
pub struct MappingService {
    definitions: Box<dyn DefinitionRepository>,
    mappings: Box<dyn MappingRepository>,
    offsets: Box<dyn OffsetProvider>,
    options: BatchOptions,
}

impl MappingService {
    /// Create a new mapping service with the given adapters.
    pub fn new(
        definitions: Box<dyn DefinitionRepository>,
        mappings: Box<dyn MappingRepository>,
        offsets: Box<dyn OffsetProvider>,
        options: BatchOptions,
    ) -> Self {
        Self {
            definitions,
            mappings,
            offsets,
            options,
        }
    }

    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// PLCs known to the offset provider.
    pub fn configured_plcs(&self) -> DevmapResult<Vec<PlcId>> {
        self.offsets.plc_ids()
    }

    /// Run one PLC's batch.
    ///
    /// `Err` means the batch as a whole failed (configuration or repository
    /// fault) and nothing was persisted. Per-record problems never surface
    /// here; they are in [`BatchReport::errors`].
    #[instrument(
        skip_all,
        fields(
            plc_id = plc_id,
            source = %self.definitions.connection(),
            dry_run = self.options.dry_run
        )
    )]
    pub fn generate(&self, plc_id: PlcId) -> DevmapResult<BatchReport> {
        let run_id = Uuid::new_v4();
        let aggregator = ErrorAggregator::tagged(Classification::new(format!("run:{run_id}")));

        let records = self.synthesize_plc(plc_id, &aggregator)?;

        let persisted = if self.options.dry_run {
            debug!("Dry run, skipping persistence");
            0
        } else {
            self.mappings.save(plc_id, &records)?
        };

        let errors = aggregator.all_errors();
        info!(
            records = records.len(),
            errors = errors.len(),
            persisted,
            "Batch completed"
        );

        Ok(BatchReport {
            run_id,
            plc_id,
            records,
            errors,
            persisted,
        })
    }

    /// Run every listed PLC independently.
    ///
    /// A failing PLC does not stop the others.
    pub fn generate_all(&self, plc_ids: &[PlcId]) -> Vec<(PlcId, DevmapResult<BatchReport>)> {
        plc_ids
            .iter()
            .map(|&plc_id| {
                let result = self.generate(plc_id);
                if let Err(e) = &result {
                    warn!(plc_id, error = %e, "Batch aborted");
                }
                (plc_id, result)
            })
            .collect()
    }

    /// Compare what is stored for `plc_id` with what would be generated now.
    #[instrument(skip_all, fields(plc_id = plc_id))]
    pub fn diff(&self, plc_id: PlcId) -> DevmapResult<DiffReport> {
        let aggregator = ErrorAggregator::tagged("diff");
        let fresh = self.synthesize_plc(plc_id, &aggregator)?;
        let existing = self.mappings.load(plc_id)?;

        let diff = diff_mappings(&existing, &fresh);
        info!(changes = diff.change_count(), "Diff computed");

        Ok(DiffReport {
            plc_id,
            diff,
            errors: aggregator.all_errors(),
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn synthesize_plc(
        &self,
        plc_id: PlcId,
        aggregator: &ErrorAggregator,
    ) -> DevmapResult<Vec<DeviceMappingRecord>> {
        let offsets = self.offsets.offsets_for(plc_id)?;
        DomainValidator::validate_offsets(&offsets, plc_id)?;

        let work = self.load_work(aggregator)?;
        debug!(items = work.len(), "Work list prepared");

        let records = self.run_workers(&work, &offsets, plc_id, aggregator)?;

        if self.options.check_collisions {
            let collisions = DomainValidator::find_collisions(&records);
            if !collisions.is_empty() {
                warn!(count = collisions.len(), "Address collisions detected");
            }
            aggregator.add_errors(Some(collisions.into_iter().map(|c| {
                OutputError::warning(
                    c.second.timer_id,
                    format!("address {} already assigned to {}", c.address, c.first),
                )
            })));
        }

        Ok(records)
    }

    /// Type the raw records and assign step-local sequence numbers.
    ///
    /// Timers of a step are numbered in `(index, id)` order starting at the
    /// step's `sequence_base`.
    fn load_work(&self, aggregator: &ErrorAggregator) -> DevmapResult<Vec<WorkItem>> {
        let mut steps: HashMap<StepId, ProcessStep> = HashMap::new();
        for raw in self.definitions.fetch(STEPS)? {
            match ProcessStep::from_raw(&raw) {
                Ok(step) if steps.contains_key(&step.id) => aggregator.add_error(
                    OutputError::warning(step.id, "duplicate process step ignored").for_step(),
                ),
                Ok(step) => {
                    steps.insert(step.id, step);
                }
                Err(e) => aggregator
                    .add_error(OutputError::from_domain(raw_record_id(&raw), &e).for_step()),
            }
        }

        let mut by_step: BTreeMap<StepId, Vec<TimerDefinition>> = BTreeMap::new();
        for raw in self.definitions.fetch(TIMERS)? {
            match StepTimer::from_raw(&raw) {
                Ok(st) if steps.contains_key(&st.step_id) => {
                    by_step.entry(st.step_id).or_default().push(st.timer);
                }
                Ok(st) => aggregator.add_error(OutputError::from_domain(
                    st.timer.id,
                    &DomainError::UnknownStep {
                        timer_id: st.timer.id,
                        step_id: st.step_id,
                    },
                )),
                Err(e) => aggregator.add_error(OutputError::from_domain(raw_record_id(&raw), &e)),
            }
        }

        let mut work = Vec::new();
        for (step_id, mut timers) in by_step {
            let step = &steps[&step_id];
            timers.sort_by_key(|t| (t.index, t.id));

            for (position, timer) in timers.into_iter().enumerate() {
                let sequence = u32::try_from(position)
                    .ok()
                    .and_then(|p| step.sequence_base.checked_add(p));
                match sequence {
                    Some(sequence) => work.push(WorkItem {
                        step: step.context(),
                        sequence,
                        timer,
                    }),
                    None => aggregator.add_error(OutputError::from_domain(
                        timer.id,
                        &DomainError::DeviceNumberOverflow {
                            base: step.sequence_base,
                            offset: u32::try_from(position).unwrap_or(u32::MAX),
                        },
                    )),
                }
            }
        }

        Ok(work)
    }

    /// Synthesize `work` on up to `options.workers` scoped threads.
    ///
    /// Output order equals input order regardless of worker count.
    fn run_workers(
        &self,
        work: &[WorkItem],
        offsets: &PlcOffsetSet,
        plc_id: PlcId,
        aggregator: &ErrorAggregator,
    ) -> DevmapResult<Vec<DeviceMappingRecord>> {
        if work.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.options.workers.clamp(1, work.len());
        let chunk_size = work.len().div_ceil(workers);
        let synthesizer = AddressSynthesizer::new(self.options.policy);

        let results: Vec<thread::Result<Result<Vec<DeviceMappingRecord>, DomainError>>> =
            thread::scope(|s| {
                let handles: Vec<_> = work
                    .chunks(chunk_size)
                    .map(|chunk| {
                        s.spawn(move || {
                            synthesize_chunk(synthesizer, chunk, offsets, plc_id, aggregator)
                        })
                    })
                    .collect();

                handles.into_iter().map(|h| h.join()).collect()
            });

        let mut records = Vec::with_capacity(work.len());
        for result in results {
            let chunk = result.map_err(|_| ApplicationError::WorkerPanicked { plc_id })??;
            records.extend(chunk);
        }

        Ok(records)
    }
}

/// Worker body: per-record failures go to the aggregator, a configuration
/// failure ends the chunk.
fn synthesize_chunk(
    synthesizer: AddressSynthesizer,
    chunk: &[WorkItem],
    offsets: &PlcOffsetSet,
    plc_id: PlcId,
    aggregator: &ErrorAggregator,
) -> Result<Vec<DeviceMappingRecord>, DomainError> {
    let mut records = Vec::with_capacity(chunk.len());

    for item in chunk {
        match synthesizer.synthesize(&item.timer, item.step, item.sequence, offsets, plc_id) {
            Ok(record) => records.push(record),
            Err(e) if e.is_per_record() => {
                aggregator.add_error(OutputError::from_domain(item.timer.id, &e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ConnectionDescriptor, MockDefinitionRepository, MockMappingRepository,
        MockOffsetProvider,
    };
    use crate::domain::{DeviceSpace, RawRecord, RecordKind};
    use crate::error::DevmapError;
    use serde_json::{Value, json};

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    fn definitions(steps: Vec<Value>, timers: Vec<Value>) -> MockDefinitionRepository {
        let steps: Vec<RawRecord> = steps.into_iter().map(raw).collect();
        let timers: Vec<RawRecord> = timers.into_iter().map(raw).collect();

        let mut repo = MockDefinitionRepository::new();
        repo.expect_connection()
            .return_const(ConnectionDescriptor::new("mock://project"));
        repo.expect_fetch().returning(move |category| match category {
            STEPS => Ok(steps.clone()),
            TIMERS => Ok(timers.clone()),
            _ => Ok(Vec::new()),
        });
        repo
    }

    fn offsets(table: PlcOffsetSet) -> MockOffsetProvider {
        let mut provider = MockOffsetProvider::new();
        provider
            .expect_offsets_for()
            .returning(move |_| Ok(table.clone()));
        provider
    }

    fn full_table() -> PlcOffsetSet {
        PlcOffsetSet::new()
            .with(DeviceSpace::ProcessTimer, 1000)
            .with(DeviceSpace::Timer, 2000)
    }

    fn options(workers: usize) -> BatchOptions {
        BatchOptions {
            workers,
            ..BatchOptions::default()
        }
    }

    #[test]
    fn generates_and_persists_every_valid_timer() {
        let defs = definitions(
            vec![json!({ "id": 1, "sequence_base": 10 })],
            vec![
                json!({ "id": 5, "step_id": 1, "cycle_id": 1, "category": 7, "index": 5, "name": "a" }),
                json!({ "id": 6, "step_id": 1, "cycle_id": 1, "category": 3, "index": 6, "name": "b" }),
            ],
        );

        let mut mappings = MockMappingRepository::new();
        mappings
            .expect_save()
            .withf(|plc, records| *plc == 1 && records.len() == 2)
            .times(1)
            .returning(|_, records| Ok(records.len()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            options(2),
        );

        let report = service.generate(1).unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.persisted, 2);
        let addrs: Vec<String> = report
            .records
            .iter()
            .map(|r| format!("{}/{}", r.process_address(), r.timer_address()))
            .collect();
        assert_eq!(addrs, vec!["T1010/ZR2005", "ST1011/ZR2006"]);
    }

    #[test]
    fn bad_records_are_aggregated_not_fatal() {
        let defs = definitions(
            vec![json!({ "id": 1, "sequence_base": 0 }), json!({ "id": "broken" })],
            vec![
                json!({ "id": 5, "step_id": 1, "cycle_id": 1, "category": 7, "index": 0, "name": "ok" }),
                json!({ "id": 6, "step_id": 1, "cycle_id": 1, "category": 42, "index": 1, "name": "bad code" }),
                json!({ "id": 7, "step_id": 9, "cycle_id": 1, "category": 1, "index": 2, "name": "orphan" }),
                json!({ "id": 8, "step_id": 1 }),
            ],
        );

        let mut mappings = MockMappingRepository::new();
        mappings
            .expect_save()
            .returning(|_, records| Ok(records.len()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            options(4),
        );

        let report = service.generate(1).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.error_count(), 4);
        assert!(!report.is_clean());
        assert_eq!(report.errors.for_record(6).count(), 1);
        assert_eq!(report.errors.for_record(7).count(), 1);
        assert_eq!(report.errors.for_record(8).count(), 1);

        let tag = format!("run:{}", report.run_id);
        assert!(
            report
                .errors
                .iter()
                .all(|e| e.classification().map(|c| c.as_str()) == Some(tag.as_str()))
        );
    }

    #[test]
    fn missing_offsets_abort_without_persisting() {
        let defs = definitions(vec![], vec![]);

        let mut mappings = MockMappingRepository::new();
        mappings.expect_save().never();

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(
                PlcOffsetSet::new().with(DeviceSpace::ProcessTimer, 0),
            )),
            options(1),
        );

        let err = service.generate(3).unwrap_err();
        assert!(matches!(
            err,
            DevmapError::Domain(DomainError::MissingOffsetConfiguration { plc_id: 3, .. })
        ));
        assert!(err.is_fatal_for_batch());
    }

    #[test]
    fn dry_run_skips_persistence() {
        let defs = definitions(
            vec![json!({ "id": 1, "sequence_base": 0 })],
            vec![json!({ "id": 5, "step_id": 1, "cycle_id": 1, "category": 1, "index": 0, "name": "a" })],
        );

        let mut mappings = MockMappingRepository::new();
        mappings.expect_save().never();

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            BatchOptions {
                dry_run: true,
                ..options(1)
            },
        );

        let report = service.generate(1).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.persisted, 0);
    }

    #[test]
    fn output_order_is_independent_of_worker_count() {
        let steps: Vec<Value> = (0..5)
            .map(|s| json!({ "id": s, "sequence_base": s * 100 }))
            .collect();
        let timers: Vec<Value> = (0..60)
            .map(|t| {
                json!({ "id": t, "step_id": t % 5, "cycle_id": 1,
                        "category": (t % 7) + 1, "index": t, "name": format!("t{t}") })
            })
            .collect();

        let run = |workers: usize| {
            let mut mappings = MockMappingRepository::new();
            mappings.expect_save().returning(|_, r| Ok(r.len()));
            MappingService::new(
                Box::new(definitions(steps.clone(), timers.clone())),
                Box::new(mappings),
                Box::new(offsets(full_table())),
                options(workers),
            )
            .generate(1)
            .unwrap()
            .records
        };

        let single = run(1);
        assert_eq!(single.len(), 60);
        assert_eq!(single, run(3));
        assert_eq!(single, run(16));
    }

    #[test]
    fn overlapping_windows_are_flagged() {
        let defs = definitions(
            vec![
                json!({ "id": 1, "sequence_base": 0 }),
                json!({ "id": 2, "sequence_base": 1 }),
            ],
            vec![
                json!({ "id": 10, "step_id": 1, "cycle_id": 1, "category": 1, "index": 0, "name": "a" }),
                json!({ "id": 11, "step_id": 1, "cycle_id": 1, "category": 1, "index": 1, "name": "b" }),
                json!({ "id": 12, "step_id": 2, "cycle_id": 1, "category": 1, "index": 2, "name": "c" }),
            ],
        );

        let mut mappings = MockMappingRepository::new();
        mappings.expect_save().returning(|_, r| Ok(r.len()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            options(2),
        );

        let report = service.generate(1).unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.warning_count(), 1);
        assert!(report.is_clean());
        assert_eq!(report.errors[0].record_id(), 12);
    }

    #[test]
    fn duplicate_step_is_reported_against_the_step() {
        let defs = definitions(
            vec![
                json!({ "id": 1, "sequence_base": 0 }),
                json!({ "id": 1, "sequence_base": 50 }),
            ],
            vec![json!({ "id": 1, "step_id": 1, "cycle_id": 1, "category": 1, "index": 0, "name": "a" })],
        );

        let mut mappings = MockMappingRepository::new();
        mappings.expect_save().returning(|_, r| Ok(r.len()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            options(1),
        );

        let report = service.generate(1).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.errors.for_record(1).count(), 0);
        assert_eq!(report.errors.for_step(1).count(), 1);
        assert_eq!(report.errors[0].kind(), RecordKind::Step);
    }

    #[test]
    fn generate_all_isolates_failing_plc() {
        let defs = definitions(vec![], vec![]);

        let mut provider = MockOffsetProvider::new();
        provider.expect_offsets_for().returning(|plc| match plc {
            1 => Ok(full_table()),
            _ => Err(ApplicationError::UnknownPlc { plc_id: plc }.into()),
        });

        let mut mappings = MockMappingRepository::new();
        mappings.expect_save().times(1).returning(|_, r| Ok(r.len()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(provider),
            options(1),
        );

        let results = service.generate_all(&[1, 2]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }

    #[test]
    fn diff_compares_against_stored_mappings() {
        let defs = definitions(
            vec![json!({ "id": 1, "sequence_base": 0 })],
            vec![json!({ "id": 5, "step_id": 1, "cycle_id": 1, "category": 6, "index": 0, "name": "a" })],
        );

        let mut mappings = MockMappingRepository::new();
        mappings.expect_load().returning(|_| Ok(Vec::new()));

        let service = MappingService::new(
            Box::new(defs),
            Box::new(mappings),
            Box::new(offsets(full_table())),
            options(1),
        );

        let report = service.diff(1).unwrap();
        assert_eq!(report.diff.added.len(), 1);
        assert!(report.diff.removed.is_empty());
    }
}
