/// Pairs days with hours positionally (`"Mon-Fri 9-17"`), joined by spaces.
///
/// Extra entries of the longer list are ignored.
pub fn format_schedule<D, H>(days: &[D], hours: &[H]) -> String
where
    D: AsRef<str>,
    H: AsRef<str>,
{
    days.iter()
        .zip(hours)
        .map(|(day, hour)| format!("{} {}", day.as_ref(), hour.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
