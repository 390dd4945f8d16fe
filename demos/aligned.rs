use pagealloc::{Alignment, PageAligned};

fn main() {
    for bytes in [4096, 16384, 65536] {
        let shim = PageAligned::with_alignment(Alignment::new(bytes).unwrap());

        for size in [0, 1, bytes, bytes + 1] {
            let block = shim.try_allocate(size).unwrap();
            let addr = block.cast::<u8>().as_ptr();

            println!(
                "\nAlloc of size {size} and alignment {bytes} at {addr:?}, rounded to {}",
                block.len()
            );
            println!("Alignment check: {addr:?} % {bytes} = {}", addr as usize % bytes);

            unsafe { shim.free(Some(block.cast())) };
        }
    }

    match PageAligned::new().try_allocate(usize::MAX) {
        Ok(_) => println!("\nUnexpected success"),
        Err(err) => println!("\nHuge allocation failed: {err}"),
    }
}
