use crate::models::Priority;

/// Priority x day value table used by the Assignment Solver's objective
/// (spec.md §4.3). Isolated behind a single function per the design notes
/// in spec.md §9: the intended evolution is to learn this per user from
/// feedback, so the swap point for that future work is here and nowhere
/// else.
///
/// Beyond day 2 the table is flat per priority (spec.md §9 treats this as
/// intentional, not a placeholder).
pub fn day_value(priority: Priority, day_index: u32) -> f64 {
    const TABLE: [[f64; 3]; 7] = [
        [100_000.0, 0.0, 0.0],
        [100.0, 50.0, 10.0],
        [50.0, 25.0, 5.0],
        [40.0, 20.0, 3.0],
        [30.0, 15.0, 2.0],
        [20.0, 10.0, 1.0],
        [10.0, 5.0, 0.5],
    ];

    let row = &TABLE[priority.value() as usize];
    let column = (day_index as usize).min(2);
    row[column]
}
