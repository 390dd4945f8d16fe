//! `PageAligned` installed as the global allocator next to a logger that
//! allocates on every record. Allocation from inside the logger must not
//! re-enter logging.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{LevelFilter, Log, Metadata, Record};
use pagealloc::{Alignment, PageAligned};

#[global_allocator]
static ALLOCATOR: PageAligned = PageAligned::new();

struct FormattingLogger {
    records: AtomicUsize,
}

impl Log for FormattingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!("{} {}", record.level(), record.args());
        assert!(!line.is_empty());
        self.records.fetch_add(1, Ordering::SeqCst);
    }

    fn flush(&self) {}
}

static LOGGER: FormattingLogger = FormattingLogger {
    records: AtomicUsize::new(0),
};

#[test]
fn allocating_logger_with_global_page_aligned() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut vec: Vec<u8> = Vec::with_capacity(10);
    vec.extend_from_slice(b"page");
    assert_eq!(vec.as_ptr() as usize % pagealloc::PAGE_ALIGNMENT, 0);

    let boxed = Box::new(42u64);
    assert_eq!(*boxed, 42);

    let text = format!("{vec:?} {boxed}");
    assert!(!text.is_empty());

    // The explicit API still logs, and the logger's own allocations go
    // through the global allocator without recursing.
    let shim = PageAligned::with_alignment(Alignment::new(4096).unwrap());
    let before = LOGGER.records.load(Ordering::SeqCst);

    let block = shim.try_allocate(100).unwrap();
    unsafe { shim.free(Some(block.cast())) };
    assert!(shim.try_allocate(usize::MAX).is_err());

    assert!(LOGGER.records.load(Ordering::SeqCst) >= before + 3);
}
