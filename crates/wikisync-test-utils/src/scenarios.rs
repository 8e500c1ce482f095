//! Source trees shared by the crate and integration test suites.

use crate::docs::TestDocs;

/// `README.md` titled "Intro" and `guide/setup.md` without a heading.
pub fn intro_and_setup() -> TestDocs {
    TestDocs::new()
        .with_file("README.md", "# Intro\n\nWelcome to the docs.\n")
        .with_file("guide/setup.md", "Install the tool.\n\nThen run it.\n")
}

/// Give `guide/setup.md` a heading without touching its body.
pub fn retitle_setup(docs: &TestDocs) {
    docs.write(
        "guide/setup.md",
        "# Setup Guide\n\nInstall the tool.\n\nThen run it.\n",
    );
}

/// Two documents titled "Overview" under the same parent.
pub fn duplicate_overviews() -> TestDocs {
    TestDocs::new()
        .with_file("overview.md", "# Overview\n\nFirst.\n")
        .with_file("summary.md", "# Overview\n\nSecond.\n")
}

/// A nested tree with two sections and a hidden directory.
///
/// ```text
/// api/
///   auth.md        "Authentication"
///   endpoints.md   "Endpoints"
/// guide/
///   install.md     "Installing"
///   advanced/
///     tuning.md    "Tuning"
///     scaling.md   "Scaling"
/// index.md         "Home"
/// .drafts/wip.md   (hidden)
/// ```
pub fn nested_sections() -> TestDocs {
    TestDocs::new()
        .with_file("index.md", "# Home\n\nStart here.\n")
        .with_file("api/auth.md", "# Authentication\n\nTokens.\n")
        .with_file("api/endpoints.md", "# Endpoints\n\nList.\n")
        .with_file("guide/install.md", "# Installing\n\nSteps.\n")
        .with_file("guide/advanced/tuning.md", "# Tuning\n\nKnobs.\n")
        .with_file("guide/advanced/scaling.md", "# Scaling\n\nMore nodes.\n")
        .with_file(".drafts/wip.md", "# Work in progress\n")
}
