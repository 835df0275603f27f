//! Integration tests for devmap-core.
//!
//! Ports are backed by small hand-written fakes so the batch pipeline runs
//! end to end without any adapter crate.

use std::collections::BTreeMap;
use std::sync::Mutex;

use devmap_core::{
    application::{
        ApplicationError, BatchOptions, MappingService,
        ports::{
            ConnectionDescriptor, DefinitionRepository, MappingRepository, OffsetProvider, STEPS,
            TIMERS,
        },
    },
    domain::{
        CategoryPolicy, DeviceMappingRecord, DeviceSpace, MnemonicKind, PlcId, PlcOffsetSet,
        RawRecord,
    },
    error::{DevmapError, DevmapResult, ErrorCategory},
};
use serde_json::{Value, json};

struct FakeDefinitions {
    connection: ConnectionDescriptor,
    steps: Vec<RawRecord>,
    timers: Vec<RawRecord>,
}

impl FakeDefinitions {
    fn new(steps: Vec<Value>, timers: Vec<Value>) -> Self {
        let object = |v: Value| match v {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        };
        Self {
            connection: ConnectionDescriptor::new("fake://line-a"),
            steps: steps.into_iter().map(object).collect(),
            timers: timers.into_iter().map(object).collect(),
        }
    }
}

impl DefinitionRepository for FakeDefinitions {
    fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    fn fetch(&self, category: &str) -> DevmapResult<Vec<RawRecord>> {
        Ok(match category {
            STEPS => self.steps.clone(),
            TIMERS => self.timers.clone(),
            _ => Vec::new(),
        })
    }
}

#[derive(Default)]
struct FakeMappings {
    stored: Mutex<BTreeMap<PlcId, Vec<DeviceMappingRecord>>>,
}

impl MappingRepository for &'static FakeMappings {
    fn save(&self, plc_id: PlcId, records: &[DeviceMappingRecord]) -> DevmapResult<usize> {
        self.stored
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .insert(plc_id, records.to_vec());
        Ok(records.len())
    }

    fn load(&self, plc_id: PlcId) -> DevmapResult<Vec<DeviceMappingRecord>> {
        Ok(self
            .stored
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .get(&plc_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct FakeOffsets(BTreeMap<PlcId, PlcOffsetSet>);

impl OffsetProvider for FakeOffsets {
    fn offsets_for(&self, plc_id: PlcId) -> DevmapResult<PlcOffsetSet> {
        self.0
            .get(&plc_id)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownPlc { plc_id }.into())
    }

    fn plc_ids(&self) -> DevmapResult<Vec<PlcId>> {
        Ok(self.0.keys().copied().collect())
    }
}

fn press_line() -> FakeDefinitions {
    FakeDefinitions::new(
        vec![
            json!({ "id": 1, "sequence_base": 10, "name": "Clamp" }),
            json!({ "id": 2, "sequence_base": 50, "name": "Weld" }),
        ],
        vec![
            json!({ "id": 5, "step_id": 1, "cycle_id": 1, "category": 7, "index": 5, "name": "Clamp close" }),
            json!({ "id": 6, "step_id": 1, "cycle_id": 1, "category": 2, "index": 6, "name": "Clamp monitor" }),
            json!({ "id": 9, "step_id": 2, "cycle_id": 1, "category": 6, "index": 9, "name": "Weld on" }),
            json!({ "id": 10, "step_id": 2, "cycle_id": 1, "category": 11, "index": 10, "name": "Unknown" }),
        ],
    )
}

fn offsets() -> FakeOffsets {
    FakeOffsets(BTreeMap::from([
        (
            1,
            PlcOffsetSet::new()
                .with(DeviceSpace::ProcessTimer, 1000)
                .with(DeviceSpace::Timer, 2000),
        ),
        (
            2,
            PlcOffsetSet::new()
                .with(DeviceSpace::ProcessTimer, 4000)
                .with(DeviceSpace::Timer, 8000),
        ),
        (3, PlcOffsetSet::new().with(DeviceSpace::Timer, 0)),
    ]))
}

fn leak_store() -> &'static FakeMappings {
    Box::leak(Box::new(FakeMappings::default()))
}

#[test]
fn test_full_generate_workflow() {
    let store = leak_store();
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(store),
        Box::new(offsets()),
        BatchOptions::default(),
    );

    let report = service.generate(1).unwrap();

    let rendered: Vec<(String, String)> = report
        .records
        .iter()
        .map(|r| (r.process_address().to_string(), r.timer_address().to_string()))
        .collect();

    assert_eq!(
        rendered,
        vec![
            ("T1010".into(), "ZR2005".into()),
            ("ST1011".into(), "ZR2006".into()),
            ("T1050".into(), "ZR2009".into()),
        ]
    );
    assert!(
        report
            .records
            .iter()
            .all(|r| r.kind() == MnemonicKind::ProcessStepTimer)
    );

    // Category 11 is rejected under the strict policy but does not stop the batch.
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.errors.for_record(10).count(), 1);
    assert_eq!(report.persisted, 3);
    assert_eq!(store.load(1).unwrap(), report.records);
}

#[test]
fn test_lenient_policy_keeps_unknown_categories() {
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(leak_store()),
        Box::new(offsets()),
        BatchOptions {
            policy: CategoryPolicy::TreatAsStep,
            ..BatchOptions::default()
        },
    );

    let report = service.generate(1).unwrap();
    assert!(report.errors.is_empty());
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.records[3].process_address().to_string(), "ST1051");
}

#[test]
fn test_plcs_differ_only_by_offsets() {
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(leak_store()),
        Box::new(offsets()),
        BatchOptions::default(),
    );

    let first = service.generate(1).unwrap();
    let second = service.generate(2).unwrap();

    assert_eq!(first.records.len(), second.records.len());
    for (a, b) in first.records.iter().zip(&second.records) {
        assert_eq!(a.key().timer_id, b.key().timer_id);
        assert_eq!(a.process_address().number() + 3000, b.process_address().number());
        assert_eq!(a.timer_address().number() + 6000, b.timer_address().number());
    }
}

#[test]
fn test_generate_all_reports_each_plc() {
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(leak_store()),
        Box::new(offsets()),
        BatchOptions::default(),
    );

    let plcs = service.configured_plcs().unwrap();
    assert_eq!(plcs, vec![1, 2, 3]);

    let results = service.generate_all(&plcs);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_ok());

    // PLC 3 has no process timer offset.
    let err = results[2].1.as_ref().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.is_fatal_for_batch());
}

#[test]
fn test_unknown_plc_is_not_found() {
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(leak_store()),
        Box::new(offsets()),
        BatchOptions::default(),
    );

    let err = service.generate(42).unwrap_err();
    assert!(matches!(
        err,
        DevmapError::Application(ApplicationError::UnknownPlc { plc_id: 42 })
    ));
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn test_diff_after_generate_is_empty() {
    let store = leak_store();
    let service = MappingService::new(
        Box::new(press_line()),
        Box::new(store),
        Box::new(offsets()),
        BatchOptions::default(),
    );

    let before = service.diff(1).unwrap();
    assert_eq!(before.diff.added.len(), 3);

    service.generate(1).unwrap();

    let after = service.diff(1).unwrap();
    assert!(after.diff.is_empty());
}
