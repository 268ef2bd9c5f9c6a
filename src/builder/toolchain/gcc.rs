//! GCC/Clang command construction.

use super::{ArchDriver, CommandSpec, CompileInput, LinkInput};

pub(super) fn compile_command(driver: &ArchDriver, input: &CompileInput) -> CommandSpec {
    let mut cmd = CommandSpec::new(&driver.cxx);

    cmd = cmd.arg("-c").arg("-std=c++17").arg("-O2");
    if let Some(flag) = driver.width_flag {
        cmd = cmd.arg(flag);
    }

    cmd = cmd.arg(format!("-I{}", input.include_dir.display()));
    for define in &input.defines {
        cmd = cmd.arg(format!("-D{}", define));
    }

    cmd.arg(input.source.display().to_string())
        .arg("-o")
        .arg(input.object.display().to_string())
}

pub(super) fn link_command(driver: &ArchDriver, input: &LinkInput, lto: bool) -> CommandSpec {
    let mut cmd = CommandSpec::new(&driver.cxx);

    if let Some(flag) = driver.width_flag {
        cmd = cmd.arg(flag);
    }

    for object in &input.objects {
        cmd = cmd.arg(object.display().to_string());
    }

    cmd = cmd
        .arg("-o")
        .arg(input.output.display().to_string())
        .arg(format!("-L{}", input.lib_dir.display()))
        .arg("-lcurl");

    // no runtime dependency on shared toolchain libraries
    cmd = cmd
        .arg("-static")
        .arg("-static-libgcc")
        .arg("-static-libstdc++");

    if cfg!(windows) {
        // static curl pulls in winsock and schannel
        cmd = cmd.arg("-lws2_32").arg("-lcrypt32");
    }

    if lto {
        cmd = cmd.arg("-flto").arg("-O2");
    }

    cmd.arg("-s")
}
