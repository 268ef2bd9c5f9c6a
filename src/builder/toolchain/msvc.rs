//! MSVC command construction.
//!
//! cl.exe is both the compile and link driver; linker arguments follow
//! the `/link` separator. The target architecture is fixed by which
//! cl.exe binary runs, so no width flag appears here.

use super::{ArchDriver, CommandSpec, CompileInput, LinkInput};

pub(super) fn compile_command(driver: &ArchDriver, input: &CompileInput) -> CommandSpec {
    let mut cmd = CommandSpec::new(&driver.cxx);

    cmd = cmd
        .arg("/nologo")
        .arg("/c")
        .arg("/std:c++17")
        .arg("/EHsc")
        .arg("/O2")
        .arg("/MT");

    cmd = cmd.arg(format!("/I{}", input.include_dir.display()));
    for define in &input.defines {
        cmd = cmd.arg(format!("/D{}", define));
    }

    cmd.arg(format!("/Fo:{}", input.object.display()))
        .arg(input.source.display().to_string())
}

pub(super) fn link_command(driver: &ArchDriver, input: &LinkInput, lto: bool) -> CommandSpec {
    let mut cmd = CommandSpec::new(&driver.cxx).arg("/nologo");

    for object in &input.objects {
        cmd = cmd.arg(object.display().to_string());
    }

    cmd = cmd
        .arg(format!("/Fe:{}", input.output.display()))
        .arg("/link")
        .arg(format!("/LIBPATH:{}", input.lib_dir.display()))
        .arg("libcurl.lib")
        .arg("ws2_32.lib")
        .arg("crypt32.lib")
        .arg("wldap32.lib");

    if lto {
        cmd = cmd.arg("/LTCG");
    }

    cmd
}
