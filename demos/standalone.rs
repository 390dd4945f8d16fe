use std::ptr::NonNull;

use pagealloc::{PageAligned, RawAllocator, SystemMalloc};

fn print_alloc(name: &str, addr: NonNull<u8>, size: usize) {
    println!("{name}: requested {size} bytes, received {addr:?}");
}

fn run(name: &str, allocator: &dyn RawAllocator) {
    unsafe {
        let addr1 = allocator.allocate(1).unwrap();
        print_alloc(name, addr1, 1);

        let addr2 = allocator.allocate(1024).unwrap();
        print_alloc(name, addr2, 1024);

        let addr3 = allocator.allocate_zeroed(4, 4).unwrap();
        print_alloc(name, addr3, 16);
        println!(
            "{name}: zeroed bytes {:?}",
            std::slice::from_raw_parts(addr3.as_ptr(), 16)
        );

        println!("{name}: deallocating everything...");
        allocator.free(Some(addr1));
        allocator.free(Some(addr2));
        allocator.free(Some(addr3));
        allocator.free(None);
    }
}

fn main() {
    run("system", &SystemMalloc);
    run("page aligned", &PageAligned::new());
}
