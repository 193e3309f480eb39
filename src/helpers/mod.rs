pub mod float_binaryheap;
pub mod time_average;
