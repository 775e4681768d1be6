// Example: window math for a large fixed-height list.
use pagelist::{WindowInput, compute_window};

fn main() {
    let input = WindowInput::new(1_000_000, 48.0, 720.0)
        .with_overscan(8)
        .with_scroll_offset(123_456.0);
    let window = compute_window(input);
    println!("total_height={}", window.total_height);
    println!("rows={:?} offset_top={}", window.range(), window.offset_top);
}
