//! Command-line surface: clap definitions and dispatch.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::apptainer::Apptainer;
use crate::options::{BuildOptions, ExecOptions, InspectOptions, PullOptions, RunOptions};

#[derive(Parser, Debug)]
#[command(
    name = "rustainer",
    version,
    about = "Run Apptainer subcommands with typed flags and captured output."
)]
pub struct Cli {
    /// Container image path (SIF file, sandbox dir, or docker:// URI)
    #[arg(long, global = true)]
    pub image: Option<PathBuf>,

    /// Runtime binary to invoke instead of discovering apptainer on PATH
    #[arg(long = "bin", global = true)]
    pub bin: Option<PathBuf>,

    /// Kill the child and fail after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print the command line that would run, but do not execute
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the resolved command line before executing
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Execute a command inside the container
    Exec {
        #[command(flatten)]
        flags: ActionFlags,
        /// Command and arguments to run inside the container
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
    /// Launch the container's runscript
    Run {
        #[command(flatten)]
        flags: ActionFlags,
        /// Arguments passed to the runscript
        #[arg(trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Pull an image from a registry
    Pull {
        /// Source image URI, e.g. docker://alpine:latest
        image_uri: String,
        /// Target path for the pulled image (defaults to --image)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing image file
        #[arg(long)]
        force: bool,
        /// Download directory
        #[arg(long)]
        dir: Option<String>,
        /// Architecture to pull
        #[arg(long)]
        arch: Option<String>,
        #[arg(long)]
        disable_cache: bool,
    },
    /// Build an image from a definition file
    Build {
        /// Definition file
        deffile: PathBuf,
        /// Output image path
        output: PathBuf,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        fakeroot: bool,
        /// Produce a writable sandbox directory
        #[arg(long)]
        sandbox: bool,
        /// Skip the %test section
        #[arg(long)]
        notest: bool,
        #[arg(long)]
        disable_cache: bool,
    },
    /// Show image metadata
    Inspect {
        #[arg(long)]
        all: bool,
        #[arg(long)]
        deffile: bool,
        #[arg(long)]
        runscript: bool,
        #[arg(long)]
        labels: bool,
        #[arg(long)]
        environment: bool,
        #[arg(long)]
        json: bool,
        /// Show the image's help file
        #[arg(long)]
        helpfile: bool,
        /// Show the test script
        #[arg(long)]
        test: bool,
    },
}

/// Flags shared by `exec` and `run`.
#[derive(Args, Debug, Default)]
pub struct ActionFlags {
    /// Bind-mount spec, src[:dest[:opts]] (repeatable)
    #[arg(long = "bind", short = 'B')]
    pub bind: Vec<String>,

    /// Environment variable, KEY=VALUE (repeatable)
    #[arg(long = "env")]
    pub env: Vec<String>,

    /// In-container home directory
    #[arg(long)]
    pub home: Option<String>,

    /// Initial working directory inside the container
    #[arg(long)]
    pub pwd: Option<String>,

    #[arg(long)]
    pub contain: bool,

    #[arg(long)]
    pub cleanenv: bool,

    #[arg(long)]
    pub no_home: bool,

    /// Enable NVIDIA GPU support
    #[arg(long)]
    pub nv: bool,

    /// Enable AMD ROCm GPU support
    #[arg(long)]
    pub rocm: bool,

    #[arg(long)]
    pub fakeroot: bool,

    #[arg(long)]
    pub writable: bool,

    /// Relative CPU share weight
    #[arg(long)]
    pub cpu_shares: Option<i64>,

    /// Number of CPUs, e.g. 1.5
    #[arg(long)]
    pub cpus: Option<String>,

    /// Memory limit, e.g. 512m
    #[arg(long)]
    pub memory: Option<String>,

    /// Block IO weight: 0 (disable) or 10-1000
    #[arg(long)]
    pub blkio_weight: Option<u32>,
}

impl ActionFlags {
    pub fn to_exec_options(&self) -> Result<ExecOptions> {
        let mut opts = ExecOptions::new();
        for spec in &self.bind {
            opts.bind(spec);
        }
        for assignment in &self.env {
            opts.env_raw(assignment);
        }
        if let Some(home) = &self.home {
            opts.home(home);
        }
        if let Some(pwd) = &self.pwd {
            opts.pwd(pwd);
        }
        if self.contain {
            opts.contain();
        }
        if self.cleanenv {
            opts.cleanenv();
        }
        if self.no_home {
            opts.no_home();
        }
        if self.nv {
            opts.nv();
        }
        if self.rocm {
            opts.rocm();
        }
        if self.fakeroot {
            opts.fakeroot();
        }
        if self.writable {
            opts.writable();
        }
        if let Some(shares) = self.cpu_shares {
            opts.cpu_shares(Some(shares));
        }
        if let Some(cpus) = &self.cpus {
            opts.cpus(cpus);
        }
        if let Some(memory) = &self.memory {
            opts.memory(memory);
        }
        if let Some(weight) = self.blkio_weight {
            opts.blkio_weight(weight)?;
        }
        Ok(opts)
    }

    pub fn to_run_options(&self) -> Result<RunOptions> {
        // Same grammar, distinct builder type.
        let exec = self.to_exec_options()?;
        let mut opts = RunOptions::new();
        opts.add_all(exec.tokens().iter().cloned());
        Ok(opts)
    }
}

/// Outcome of one CLI dispatch: either a dry-run preview or a finished child.
pub enum Dispatched {
    Preview(String),
    Finished(crate::exec::CommandOutput),
}

pub fn dispatch(cli: &Cli) -> Result<Dispatched> {
    let mut runner = match &cli.image {
        Some(image) => Apptainer::with_image(image),
        None => Apptainer::new(),
    };
    if let Some(bin) = &cli.bin {
        runner = runner.binary(bin);
    }
    if let Some(secs) = cli.timeout {
        runner = runner.timeout(Duration::from_secs(secs));
    }

    match &cli.command {
        Cmd::Exec { flags, command } => {
            let opts = flags.to_exec_options()?;
            if cli.dry_run {
                return Ok(Dispatched::Preview(
                    runner.preview_exec(command.iter().cloned(), Some(&opts))?,
                ));
            }
            if cli.verbose {
                eprintln!(
                    "+ {}",
                    runner.preview_exec(command.iter().cloned(), Some(&opts))?
                );
            }
            Ok(Dispatched::Finished(
                runner.exec(command.iter().cloned(), Some(&opts))?,
            ))
        }
        Cmd::Run { flags, command } => {
            let opts = flags.to_run_options()?;
            if cli.dry_run {
                return Ok(Dispatched::Preview(
                    runner.preview_run(command.iter().cloned(), Some(&opts))?,
                ));
            }
            if cli.verbose {
                eprintln!(
                    "+ {}",
                    runner.preview_run(command.iter().cloned(), Some(&opts))?
                );
            }
            Ok(Dispatched::Finished(
                runner.run(command.iter().cloned(), Some(&opts))?,
            ))
        }
        Cmd::Pull {
            image_uri,
            path,
            force,
            dir,
            arch,
            disable_cache,
        } => {
            let mut opts = PullOptions::new();
            if *force {
                opts.force();
            }
            if let Some(dir) = dir {
                opts.dir(dir);
            }
            if let Some(arch) = arch {
                opts.arch(arch);
            }
            if *disable_cache {
                opts.disable_cache();
            }
            if cli.dry_run {
                return Ok(Dispatched::Preview(runner.preview_pull(
                    image_uri,
                    path.as_deref(),
                    Some(&opts),
                )?));
            }
            if cli.verbose {
                eprintln!(
                    "+ {}",
                    runner.preview_pull(image_uri, path.as_deref(), Some(&opts))?
                );
            }
            Ok(Dispatched::Finished(runner.pull(
                image_uri,
                path.as_deref(),
                Some(&opts),
            )?))
        }
        Cmd::Build {
            deffile,
            output,
            force,
            fakeroot,
            sandbox,
            notest,
            disable_cache,
        } => {
            let mut opts = BuildOptions::new();
            if *force {
                opts.force();
            }
            if *fakeroot {
                opts.fakeroot();
            }
            if *sandbox {
                opts.sandbox();
            }
            if *notest {
                opts.notest();
            }
            if *disable_cache {
                opts.disable_cache();
            }
            if cli.dry_run {
                return Ok(Dispatched::Preview(
                    runner.preview_build(deffile, output, Some(&opts))?,
                ));
            }
            if cli.verbose {
                eprintln!("+ {}", runner.preview_build(deffile, output, Some(&opts))?);
            }
            Ok(Dispatched::Finished(runner.build(deffile, output, Some(&opts))?))
        }
        Cmd::Inspect {
            all,
            deffile,
            runscript,
            labels,
            environment,
            json,
            helpfile,
            test,
        } => {
            let mut opts = InspectOptions::new();
            if *all {
                opts.all();
            }
            if *deffile {
                opts.deffile();
            }
            if *runscript {
                opts.runscript();
            }
            if *labels {
                opts.labels();
            }
            if *environment {
                opts.environment();
            }
            if *json {
                opts.json();
            }
            if *helpfile {
                opts.helpfile();
            }
            if *test {
                opts.test();
            }
            if cli.dry_run {
                return Ok(Dispatched::Preview(runner.preview_inspect(Some(&opts))?));
            }
            if cli.verbose {
                eprintln!("+ {}", runner.preview_inspect(Some(&opts))?);
            }
            Ok(Dispatched::Finished(runner.inspect(Some(&opts))?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_exec_preview() {
        let cli = Cli::parse_from([
            "rustainer",
            "--image",
            "/tmp/alpine.sif",
            "--bin",
            "/usr/bin/apptainer",
            "--dry-run",
            "exec",
            "--cleanenv",
            "--env",
            "A=1",
            "ls",
            "/",
        ]);
        match dispatch(&cli).unwrap() {
            Dispatched::Preview(line) => assert_eq!(
                line,
                "/usr/bin/apptainer exec --cleanenv --env A=1 /tmp/alpine.sif ls /"
            ),
            Dispatched::Finished(_) => panic!("dry-run must not execute"),
        }
    }

    #[test]
    fn test_dry_run_build_preview() {
        let cli = Cli::parse_from([
            "rustainer",
            "--bin",
            "/usr/bin/apptainer",
            "--dry-run",
            "build",
            "--fakeroot",
            "alpine.def",
            "alpine.sif",
        ]);
        match dispatch(&cli).unwrap() {
            Dispatched::Preview(line) => assert_eq!(
                line,
                "/usr/bin/apptainer build --fakeroot alpine.sif alpine.def"
            ),
            Dispatched::Finished(_) => panic!("dry-run must not execute"),
        }
    }

    #[test]
    fn test_inspect_exposes_all_builder_flags() {
        let cli = Cli::parse_from([
            "rustainer",
            "--image",
            "/tmp/alpine.sif",
            "--bin",
            "/usr/bin/apptainer",
            "--dry-run",
            "inspect",
            "--labels",
            "--helpfile",
            "--test",
        ]);
        match dispatch(&cli).unwrap() {
            Dispatched::Preview(line) => assert_eq!(
                line,
                "/usr/bin/apptainer inspect --labels --helpfile --test /tmp/alpine.sif"
            ),
            Dispatched::Finished(_) => panic!("dry-run must not execute"),
        }
    }

    #[test]
    fn test_blkio_weight_rejected_before_spawn() {
        let cli = Cli::parse_from([
            "rustainer",
            "--image",
            "/tmp/alpine.sif",
            "--bin",
            "/usr/bin/apptainer",
            "--dry-run",
            "exec",
            "--blkio-weight",
            "5",
            "true",
        ]);
        assert!(dispatch(&cli).is_err());
    }
}
