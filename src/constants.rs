pub const DEFAULT_PID: u32 = 1;

pub const PAGE_SHIFT: u32 = 12;
pub const DEFAULT_PAGE_SIZE: usize = 1 << PAGE_SHIFT;
pub const DEFAULT_LOGIC_PAGES: usize = 10;
pub const DEFAULT_LOGIC_SIZE: usize = DEFAULT_PAGE_SIZE * DEFAULT_LOGIC_PAGES;

// physical block numbers handed to the process, one per frame slot
pub const DEFAULT_FRAME_LIST: [usize; 4] = [3, 5, 8, 10];

pub const DEFAULT_RANDOM_LENGTH: usize = 300;
pub const DEFAULT_WRITE_RATIO: f64 = 0.3;

pub const MODE_READ: u8 = 0;
pub const MODE_WRITE: u8 = 1;
