//! Chapter selection expressions: `1,2,3` or `1000,1005,1070-1077`.

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid chapter selection: '{0}'")]
    Invalid(String),
}

/// Expands a comma separated list of chapters and inclusive `a-b` ranges,
/// keeping the order they were written in.
pub fn parse(selection: &str) -> Result<Vec<u32>, SelectionError> {
    let mut chapters = Vec::new();
    for item in selection.split(',') {
        let item = item.trim();
        let invalid = || SelectionError::Invalid(item.to_owned());

        match item.split_once('-') {
            Some((start, end)) => {
                let start = chapter(start).ok_or_else(invalid)?;
                let end = chapter(end).ok_or_else(invalid)?;
                if start > end {
                    return Err(invalid());
                }
                chapters.extend(start..=end);
            }
            None => chapters.push(chapter(item).ok_or_else(invalid)?),
        }
    }
    Ok(chapters)
}

fn chapter(s: &str) -> Option<u32> {
    s.trim().parse().ok().filter(|&n| n > 0)
}
