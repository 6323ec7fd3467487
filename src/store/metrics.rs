use prometheus::{register_int_counter, IntCounter};

lazy_static::lazy_static! {
    pub static ref READS: IntCounter = register_int_counter!(
        "tablekv_reads_total",
        "Read operations served"
    ).unwrap();

    pub static ref WRITES: IntCounter = register_int_counter!(
        "tablekv_writes_total",
        "Write operations served"
    ).unwrap();

    pub static ref DELETES: IntCounter = register_int_counter!(
        "tablekv_deletes_total",
        "Delete operations served"
    ).unwrap();

    pub static ref LISTS: IntCounter = register_int_counter!(
        "tablekv_lists_total",
        "List operations served"
    ).unwrap();

    pub static ref REAPED: IntCounter = register_int_counter!(
        "tablekv_reaped_total",
        "Expired records removed by the reaper"
    ).unwrap();
}
