use flexi_logger::{DeferredNow, Record, style};

/// `LEVEL message`, level colored. Debug and trace records also carry the
/// emitting module.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    let level = record.level();
    let label = style(level).paint(format!("{level:<5}"));
    if level >= log::Level::Debug {
        write!(
            w,
            "{label} [{}] {}",
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        )
    } else {
        write!(w, "{label} {}", record.args())
    }
}
