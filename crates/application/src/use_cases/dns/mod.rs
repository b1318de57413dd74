mod resolve_ptr;

pub use resolve_ptr::ResolvePtrUseCase;
