//! Test helpers for driving the CLI against a scratch marker store.

use super::*;
use crate::route::{RouteConfig, RouteProviderBuilder};
use pinroute_core::{RoutingError, RoutingProvider};
use pinroute_data::routing::test_support::StubRoutingProvider;
use std::cell::RefCell;
use tempfile::TempDir;

/// A temporary directory holding the marker store for one test.
pub(super) struct Workspace {
    _dir: TempDir,
    store: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            store: root.join("markers.json"),
            _dir: dir,
        }
    }

    pub(super) fn store(&self) -> &Utf8PathBuf {
        &self.store
    }

    /// Run `pinroute --store <store> <args...>` with the given provider.
    pub(super) fn run(
        &self,
        args: &[&str],
        builder: &StubProviderBuilder,
    ) -> (Result<(), CliError>, String) {
        let mut argv = vec![
            "pinroute".to_owned(),
            "--store".to_owned(),
            self.store.as_str().to_owned(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        let mut stdout = Vec::new();
        let result = Cli::try_parse_from(argv)
            .map_err(CliError::from)
            .and_then(|cli| run_with(cli, builder, &mut stdout));
        let stdout = String::from_utf8(stdout).expect("stdout utf-8");
        (result, stdout)
    }

    /// Add a marker, panicking when the command fails.
    pub(super) fn add(&self, lat: f64, lng: f64, name: &str, category: &str) {
        let (lat, lng) = (lat.to_string(), lng.to_string());
        let (result, _) = self.run(
            &[
                "add",
                "--lat",
                &lat,
                "--lng",
                &lng,
                "--name",
                name,
                "--category",
                category,
            ],
            &StubProviderBuilder::straight_lines(),
        );
        if let Err(err) = result {
            panic!("adding {name:?} failed: {err}");
        }
    }
}

/// Hands out clones of a stub provider.
#[derive(Debug)]
pub(super) struct StubProviderBuilder {
    provider: StubRoutingProvider,
}

impl StubProviderBuilder {
    pub(super) const fn straight_lines() -> Self {
        Self {
            provider: StubRoutingProvider::straight_lines(),
        }
    }

    pub(super) const fn failing(error: RoutingError) -> Self {
        Self {
            provider: StubRoutingProvider::with_error(error),
        }
    }
}

impl RouteProviderBuilder for StubProviderBuilder {
    fn build(&self, _config: &RouteConfig) -> Result<Box<dyn RoutingProvider>, CliError> {
        Ok(Box::new(self.provider.clone()))
    }
}

/// Shared state for the behaviour scenarios.
pub(super) struct CliWorld {
    pub(super) workspace: Workspace,
    pub(super) builder: RefCell<StubProviderBuilder>,
    pub(super) stdout: RefCell<String>,
    pub(super) result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    pub(super) fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            builder: RefCell::new(StubProviderBuilder::straight_lines()),
            stdout: RefCell::new(String::new()),
            result: RefCell::new(None),
        }
    }

    /// Run a command and record its outcome.
    pub(super) fn run(&self, args: &[&str]) {
        let (result, stdout) = self.workspace.run(args, &self.builder.borrow());
        self.stdout.replace(stdout);
        self.result.replace(Some(result));
    }

    /// Panic unless the last command succeeded; return its output.
    pub(super) fn succeeded(&self) -> String {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        self.stdout.borrow().clone()
    }

    /// Apply `check` to the error of the last command.
    pub(super) fn failed_with(&self, check: impl FnOnce(&CliError)) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error);
    }
}
