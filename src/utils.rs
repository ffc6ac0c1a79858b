use anyhow::{Result, bail};
use std::{collections::HashSet, fmt::Debug, hash::Hash, ops::RangeBounds};

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {:?}, but is {:?}", range, num);
    }

    Ok(())
}

pub fn check_unique<'a, T, I>(items: I) -> Result<()>
where
    T: Eq + Hash + Debug + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item) {
            bail!("{item:?} appears more than once");
        }
    }

    Ok(())
}
