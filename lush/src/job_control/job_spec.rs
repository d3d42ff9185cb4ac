// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::Job;

/// Resolves a job spec against `jobs` (oldest first, disowned jobs already filtered).
///
/// | spec                  | job                                                   |
/// | :-------------------- | :---------------------------------------------------- |
/// | none, `%`, `%+`       | most recent job that isn't done, else the last job    |
/// | `%-`                  | second most recent job that isn't done                |
/// | `%N`, `N`             | job id `N`, else the job whose pid is `N`             |
/// | anything else         | first job whose command starts w/ the text (`%` is optional) |
#[must_use]
pub fn find_job<'a>(jobs: &[&'a Job], spec: Option<&str>) -> Option<&'a Job> {
    let mut not_done = jobs.iter().rev().filter(|job| !job.is_done());

    match spec {
        None | Some("%" | "%+") => not_done.next().or_else(|| jobs.last()).copied(),
        Some("%-") => not_done.nth(1).copied(),
        Some(spec) => {
            let normalized = spec.strip_prefix('%').unwrap_or(spec);
            match normalized.parse::<u32>() {
                Ok(number) => jobs
                    .iter()
                    .find(|job| u32::try_from(job.id).is_ok_and(|id| id == number))
                    .or_else(|| jobs.iter().find(|job| job.pid == Some(number)))
                    .copied(),
                Err(_) => jobs
                    .iter()
                    .find(|job| job.command.starts_with(normalized))
                    .copied(),
            }
        }
    }
}
