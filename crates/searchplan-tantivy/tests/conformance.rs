use searchplan_conformance::Fixture;
use searchplan_tantivy::{IndexConfig, TantivyEngine};

const INDEX_NAME: &str = "base";

fn init_on_disk() -> Fixture<TantivyEngine> {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine =
        TantivyEngine::open([IndexConfig::on_disk(INDEX_NAME, dir.path().join("base.idx"))]).expect("on-disk engine");
    Fixture::new(engine, INDEX_NAME).with_guard(dir)
}

fn init_in_memory() -> Fixture<TantivyEngine> {
    let engine = TantivyEngine::open([IndexConfig::in_memory(INDEX_NAME), IndexConfig::in_memory("other")])
        .expect("in-memory engine");
    Fixture::new(engine, INDEX_NAME)
}

mod on_disk {
    searchplan_conformance::conformance_tests!(super::init_on_disk);
}

mod in_memory {
    searchplan_conformance::conformance_tests!(super::init_in_memory);
}
