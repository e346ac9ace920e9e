//! Testcase text format: a newline-delimited, line-oriented
//! encoding of one solve scenario - repos, system arch, vendor classes,
//! solver flags, namespace fixtures, jobs, and the expected result - used
//! for regression fixtures and bug reports.
//!
//! Grounded on `ext/testcase.c` from openSUSE libsolv for the keyword set
//! and line grammar, reusing this crate's `job::{str2job, Job}` (already
//! round-trip tested) for the `job` lines rather than re-implementing job
//! parsing here.

use crate::error::{Result, SolvError};

use super::job::{str2job, Job, JobQueue};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoLine {
    pub name: String,
    pub priority: i32,
    pub repotype: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemLine {
    pub arch: String,
    pub disttype: String,
    pub installed_repo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceLine {
    pub name: String,
    pub args: Vec<String>,
}

/// The parsed, structurally-typed form of a testcase file. Round-trips
/// through [`write`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestcaseDoc {
    pub repos: Vec<RepoLine>,
    pub system: Option<SystemLine>,
    pub vendorclasses: Vec<Vec<String>>,
    /// Raw `(flag-name, enabled)` pairs in file order, as written with a
    /// leading `+`/`-`. Use [`apply_solverflags`] to fold them onto a
    /// [`crate::config::SolverFlags`].
    pub solverflags: Vec<(String, bool)>,
    pub namespaces: Vec<NamespaceLine>,
    /// Raw job strings (parse with [`job::str2job`]).
    pub jobs: Vec<String>,
    /// Either an inline result description or a `file` path reference.
    pub result: Option<String>,
}

/// Parse a testcase file into its structural form. Unknown keywords and
/// malformed lines fail with the 1-indexed line number.
pub fn parse(input: &str) -> Result<TestcaseDoc> {
    let mut doc = TestcaseDoc::default();
    for (idx, raw) in input.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.split_once(' ') {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };
        match keyword {
            "repo" => {
                let fields: Vec<&str> = rest.splitn(4, ' ').collect();
                if fields.len() < 4 {
                    return Err(testcase_err(lineno, "repo needs: name priority type file"));
                }
                let priority = fields[1].parse().map_err(|_| testcase_err(lineno, "repo priority must be an integer"))?;
                doc.repos.push(RepoLine {
                    name: fields[0].to_string(),
                    priority,
                    repotype: fields[2].to_string(),
                    file: fields[3].to_string(),
                });
            }
            "system" => {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                if fields.len() < 3 {
                    return Err(testcase_err(lineno, "system needs: arch disttype installed-repo"));
                }
                doc.system = Some(SystemLine {
                    arch: fields[0].to_string(),
                    disttype: fields[1].to_string(),
                    installed_repo: fields[2].to_string(),
                });
            }
            "vendorclass" => {
                doc.vendorclasses.push(rest.split_whitespace().map(str::to_string).collect());
            }
            "solverflags" => {
                for tok in rest.split_whitespace() {
                    if let Some(name) = tok.strip_prefix('+') {
                        doc.solverflags.push((name.to_string(), true));
                    } else if let Some(name) = tok.strip_prefix('-') {
                        doc.solverflags.push((name.to_string(), false));
                    } else {
                        return Err(testcase_err(lineno, "solverflags entries need a +/- prefix"));
                    }
                }
            }
            "namespace" => {
                let mut fields = rest.split_whitespace();
                let name = fields.next().ok_or_else(|| testcase_err(lineno, "namespace needs a name"))?.to_string();
                doc.namespaces.push(NamespaceLine { name, args: fields.map(str::to_string).collect() });
            }
            "job" => doc.jobs.push(rest.to_string()),
            "result" => doc.result = Some(rest.to_string()),
            other => return Err(testcase_err(lineno, &format!("unknown keyword '{other}'"))),
        }
    }
    Ok(doc)
}

fn testcase_err(line: usize, message: &str) -> SolvError {
    SolvError::Testcase { line, message: message.to_string() }
}

/// Serialise a [`TestcaseDoc`] back to the line format [`parse`] accepts.
pub fn write(doc: &TestcaseDoc) -> String {
    let mut out = String::new();
    for r in &doc.repos {
        out.push_str(&format!("repo {} {} {} {}\n", r.name, r.priority, r.repotype, r.file));
    }
    if let Some(s) = &doc.system {
        out.push_str(&format!("system {} {} {}\n", s.arch, s.disttype, s.installed_repo));
    }
    for vc in &doc.vendorclasses {
        out.push_str(&format!("vendorclass {}\n", vc.join(" ")));
    }
    if !doc.solverflags.is_empty() {
        let flags: Vec<String> = doc.solverflags.iter().map(|(n, on)| format!("{}{n}", if *on { "+" } else { "-" })).collect();
        out.push_str(&format!("solverflags {}\n", flags.join(" ")));
    }
    for ns in &doc.namespaces {
        if ns.args.is_empty() {
            out.push_str(&format!("namespace {}\n", ns.name));
        } else {
            out.push_str(&format!("namespace {} {}\n", ns.name, ns.args.join(" ")));
        }
    }
    for j in &doc.jobs {
        out.push_str(&format!("job {j}\n"));
    }
    if let Some(r) = &doc.result {
        out.push_str(&format!("result {r}\n"));
    }
    out
}

/// Fold the parsed `+flag`/`-flag` pairs onto a flag struct, in file order
/// (later entries win).
pub fn apply_solverflags(flags: &mut crate::config::SolverFlags, pairs: &[(String, bool)]) -> Result<()> {
    for (name, on) in pairs {
        let on = *on;
        match name.as_str() {
            "allowdowngrade" => flags.allow_downgrade = on,
            "allowarchchange" => flags.allow_archchange = on,
            "allowvendorchange" => flags.allow_vendorchange = on,
            "allowuninstall" => flags.allow_uninstall = on,
            "noupdateprovide" => flags.no_updateprovide = on,
            "splitprovides" => flags.splitprovides = on,
            "ignorerecommended" => flags.ignore_recommended = on,
            "ignorealreadyrecommended" => flags.ignore_already_recommended = on,
            "noinfarchcheck" => flags.no_infarchcheck = on,
            "bestobeypolicy" => flags.best_obey_policy = on,
            "keeporphans" => flags.keep_orphans = on,
            "yumobsoletes" => flags.yum_obsoletes = on,
            "needupdateprovide" => flags.need_updateprovide = on,
            "dontfix" => flags.dontfix = on,
            "obsoleteusesprovides" => flags.obsoleteusesprovides = on,
            "noinstalledobsoletes" => flags.noinstalledobsoletes = on,
            "forbidselfconflicts" => flags.forbidselfconflicts = on,
            "implicitobsoleteusescolors" => flags.implicitobsoleteusescolors = on,
            "strongrecommends" => flags.strong_recommends = on,
            other => return Err(SolvError::UnknownFlag(other.to_string())),
        }
    }
    Ok(())
}

/// Parse every `job` line into a [`JobQueue`], failing on the first
/// unparseable line.
pub fn jobs_from_doc(doc: &TestcaseDoc) -> Result<JobQueue> {
    let mut queue = JobQueue::new();
    for line in &doc.jobs {
        let job = str2job(line).ok_or_else(|| SolvError::InvalidJob(line.clone()))?;
        queue.push(job);
    }
    Ok(queue)
}

/// Render a job queue back into `job2str` lines, in order.
pub fn jobs_to_lines(jobs: &JobQueue) -> Vec<String> {
    jobs.iter().map(|(_, j): (usize, &Job)| j.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
repo main 0 susetags main.repo
system x86_64 rpm main
vendorclass suse opensuse
solverflags +allowdowngrade -noinfarchcheck
namespace modalias(foo) pkgA
job install foo
result inline:pass
";

    #[test]
    fn parses_every_keyword() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.repos.len(), 1);
        assert_eq!(doc.repos[0].name, "main");
        assert_eq!(doc.system.as_ref().unwrap().arch, "x86_64");
        assert_eq!(doc.vendorclasses, vec![vec!["suse".to_string(), "opensuse".to_string()]]);
        assert_eq!(doc.solverflags, vec![("allowdowngrade".to_string(), true), ("noinfarchcheck".to_string(), false)]);
        assert_eq!(doc.namespaces.len(), 1);
        assert_eq!(doc.jobs, vec!["install foo".to_string()]);
        assert_eq!(doc.result.as_deref(), Some("inline:pass"));
    }

    #[test]
    fn round_trips_through_write() {
        let doc = parse(SAMPLE).unwrap();
        let rewritten = write(&doc);
        let reparsed = parse(&rewritten).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn unknown_keyword_fails_with_line_number() {
        let err = parse("bogus line\n").unwrap_err();
        match err {
            SolvError::Testcase { line, .. } => assert_eq!(line, 1),
            other => panic!("expected Testcase error, got {other:?}"),
        }
    }

    #[test]
    fn jobs_round_trip_through_job_module() {
        let mut doc = TestcaseDoc::default();
        doc.jobs.push("install foo[weak]".to_string());
        let queue = jobs_from_doc(&doc).unwrap();
        let lines = jobs_to_lines(&queue);
        assert_eq!(lines, doc.jobs);
    }
}
