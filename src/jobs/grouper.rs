//! Fixed-size contiguous job groups.
//!
//! Concatenating the groups in order gives back the input list exactly.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group size must be at least 1")]
    ZeroGroupSize,

    #[error("job {job} is out of range (max: {})", last_job(.jobs))]
    JobOutOfRange { job: usize, jobs: usize },
}

fn last_job(jobs: &usize) -> i64 {
    *jobs as i64 - 1
}

/// Number of jobs needed for `n_files` files: `ceil(n_files / group_size)`.
pub fn job_count(n_files: usize, group_size: usize) -> Result<usize, GroupError> {
    if group_size == 0 {
        return Err(GroupError::ZeroGroupSize);
    }
    Ok(n_files.div_ceil(group_size))
}

/// Split `files` into groups of `group_size`; the last group may be shorter.
pub fn group_files<T>(files: &[T], group_size: usize) -> Result<Vec<&[T]>, GroupError> {
    if group_size == 0 {
        return Err(GroupError::ZeroGroupSize);
    }
    Ok(files.chunks(group_size).collect())
}

/// Files of job `job`.
pub fn job_files<T>(files: &[T], group_size: usize, job: usize) -> Result<&[T], GroupError> {
    let jobs = job_count(files.len(), group_size)?;
    if job >= jobs {
        return Err(GroupError::JobOutOfRange { job, jobs });
    }
    let start = job * group_size;
    let end = (start + group_size).min(files.len());
    Ok(&files[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/skims/3l/WZ/file_{i:03}.root")).collect()
    }

    #[test]
    fn twenty_three_files_in_groups_of_five() {
        let files = paths(23);
        let groups = group_files(&files, 5).unwrap();
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5, 5, 3]);
        assert_eq!(job_count(files.len(), 5), Ok(5));

        let tail = job_files(&files, 5, 4).unwrap();
        assert_eq!(tail, &files[20..]);

        assert_eq!(
            job_files(&files, 5, 5),
            Err(GroupError::JobOutOfRange { job: 5, jobs: 5 })
        );
    }

    #[test]
    fn grouping_is_lossless_for_every_group_size() {
        let files = paths(17);
        for size in 1..=20 {
            let groups = group_files(&files, size).unwrap();
            let rebuilt: Vec<String> = groups.concat();
            assert_eq!(rebuilt, files, "group size {size}");
            assert!(groups.iter().all(|g| !g.is_empty() && g.len() <= size));

            let by_job: Vec<String> = (0..groups.len())
                .flat_map(|job| job_files(&files, size, job).unwrap().to_vec())
                .collect();
            assert_eq!(by_job, files, "job_files, group size {size}");
        }
    }

    #[test]
    fn grouping_is_deterministic() {
        let files = paths(11);
        assert_eq!(group_files(&files, 3).unwrap(), group_files(&files, 3).unwrap());
    }

    #[test]
    fn empty_list_has_no_jobs() {
        let files: Vec<String> = Vec::new();
        assert!(group_files(&files, 4).unwrap().is_empty());
        let err = job_files(&files, 4, 0).unwrap_err();
        assert_eq!(err, GroupError::JobOutOfRange { job: 0, jobs: 0 });
        assert_eq!(err.to_string(), "job 0 is out of range (max: -1)");
    }

    #[test]
    fn zero_group_size_is_rejected() {
        assert_eq!(group_files(&paths(3), 0), Err(GroupError::ZeroGroupSize));
        assert_eq!(job_files(&paths(3), 0, 0), Err(GroupError::ZeroGroupSize));
    }

    #[test]
    fn out_of_range_message_names_the_last_job() {
        let err = job_files(&paths(23), 5, 7).unwrap_err();
        assert_eq!(err.to_string(), "job 7 is out of range (max: 4)");
    }
}
