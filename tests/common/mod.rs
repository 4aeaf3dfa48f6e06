// tests/common/mod.rs

//! Shared fixtures for recipe integration tests.

#![allow(dead_code)]

use m3cook::recipe::{MakeOutput, QuerySpec};
use m3cook::{Error, Toolchain};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub const BIN: &str = "Linux2_x86_64ifx";

pub const IOAPI_MAKEFILE: &str = "\
#  Makefile for the I/O API
#
#BIN = Linux2_x86_64
#BASEDIR = ${PWD}
#INSTALL = ${HOME}
#LIBINST = $(INSTALL)/$(BIN)
#CPLMODE = nocpl   # turn off PVM coupling mode
NCFLIBS = -lnetcdff -lnetcdf
#NCFLIBS = -lnetcdff -lnetcdf -lhdf5_hl -lhdf5 -lz
#IOAPIDEFS = \"-DIOAPI_NCF4\"
#PVMINCL = $(PVM_ROOT)/conf/$(PVM_ARCH).def
#PVMINCL =
BASEDIR = ${PWD}

configure: ${IODIR}/Makefile ${TOOLDIR}/Makefile
\t(cd $(IODIR); sed -f Makefile.$(CPLMODE).sed < Makefile.$(CPLMODE) > Makefile)
";

pub const IOAPI_SED: &str = "\
BASEDIR = ${HOME}/ioapi-3.2
MAKEINCLUDE.$(BIN)
#DEFINEFLAGS = -DIOAPI_NCF4=1 $(ARCHFLAGS) $(PARFLAGS)
DEFINEFLAGS = -DIOAPI_PNCF=1 $(ARCHFLAGS) $(PARFLAGS)
#VFLAG  = -DVERSION='3.2-nocpl-ncf4'
VFLAG  = -DVERSION='3.2-nocpl-mpi'
";

pub const IFORT_MAKEINCLUDE: &str = "\
AR   = ar
CC   = icc
CXX  = icpc
FC   = ifort -auto -warn notruncated_source -static-intel
OMPFLAGS  = -openmp
OMPLIBS   = -openmp -openmp-link=static
#MFLAGS    = -traceback                      # generic
MFLAGS    = -traceback -xHost                # this-machine
FOPTFLAGS = -O3 -unroll -stack_temps -safe_cray_ptr
";

pub const SORTIC: &str = "\
#include <stdio.h>
#include \"parms3.h\"

void sortic_(int *n, int *ind) { qsort(ind, *n, sizeof(int), cmp); }
";

pub const SMOKE_MAKEFILE: &str = "\
include Makeinclude

all: lib exe
install: $(INSTDIR) all
\tcp $(EXE) $(INSTDIR)
";

pub const SMOKE_MAKEINCLUDE: &str = "\
BASEDIR = ${SMK_HOME}/subsys/smoke/src
IOBASE  = ${SMK_HOME}/subsys/ioapi
OBJDIR  = ${BASEDIR}/../${BIN}
IOBIN   = ${IOBASE}/${BIN}
INSTDIR = /somewhere/apps/${BIN}
include ${IODIR}/Makeinclude.${BIN}
IFLAGS = -I${IOINC} -I${INCDIR} -I${IOBIN}
EFLAG = -extend-source 132 -zero
IOLIB = -L$(IOBIN) -lioapi -lnetcdff -lnetcdf
";

/// Staged source tree plus an empty install prefix.
pub struct Stage {
    pub dir: TempDir,
}

impl Stage {
    pub fn source(&self) -> PathBuf {
        self.dir.path().join("source")
    }

    pub fn prefix(&self) -> PathBuf {
        self.dir.path().join("prefix")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.source().join(relative)).unwrap()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.source().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn empty_stage() -> Stage {
    let stage = Stage {
        dir: tempfile::tempdir().unwrap(),
    };
    fs::create_dir_all(stage.source()).unwrap();
    fs::create_dir_all(stage.prefix()).unwrap();
    stage
}

/// Staged ioapi source with the templates its recipe edits.
pub fn ioapi_stage() -> Stage {
    let stage = empty_stage();
    stage.write("Makefile.template", IOAPI_MAKEFILE);
    stage.write("ioapi/Makefile.nocpl.sed", IOAPI_SED);
    stage.write("m3tools/Makefile.nocpl.sed", "BASEDIR = ${HOME}/ioapi-3.2\n");
    stage.write("ioapi/Makeinclude.Linux2_x86_64ifort", IFORT_MAKEINCLUDE);
    stage.write("ioapi/sortic.c", SORTIC);
    stage.write("ioapi/PARMS3.EXT", "      INTEGER MXVARS3\n");
    stage.write("ioapi/FDESC3.EXT", "      CHARACTER*16 GDNAM3D\n");
    stage.write("ioapi/fixed_src/PARMS3.EXT", "      INTEGER MXVARS3\n");
    stage
}

/// Staged SMOKE source.
pub fn smoke_stage() -> Stage {
    let stage = empty_stage();
    stage.write("src/Makefile", SMOKE_MAKEFILE);
    stage.write("src/Makeinclude", SMOKE_MAKEINCLUDE);
    stage
}

/// Toolchain that records calls instead of spawning processes.
pub struct RecordingToolchain {
    pub targets: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
    query_result: Result<String, String>,
    fail_target: Option<String>,
}

impl RecordingToolchain {
    pub fn new() -> Self {
        Self {
            targets: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            query_result: Ok("-L/opt/netcdf/lib -lnetcdf".to_string()),
            fail_target: None,
        }
    }

    /// Queries exit non-zero with `message`.
    pub fn failing_query(message: &str) -> Self {
        Self {
            query_result: Err(message.to_string()),
            ..Self::new()
        }
    }

    /// `make <target>` exits non-zero.
    pub fn failing_target(target: &str) -> Self {
        Self {
            fail_target: Some(target.to_string()),
            ..Self::new()
        }
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Toolchain for RecordingToolchain {
    fn make(&self, target: &str, _workdir: &Path) -> m3cook::Result<MakeOutput> {
        self.targets.lock().unwrap().push(target.to_string());
        if self.fail_target.as_deref() == Some(target) {
            return Err(Error::BuildFailed {
                target: target.to_string(),
                code: Some(2),
                stderr: format!("make: *** No rule to make target '{}'", target),
            });
        }
        Ok(MakeOutput {
            stdout: format!("built {}", target),
            stderr: String::new(),
        })
    }

    fn query(&self, spec: &QuerySpec) -> m3cook::Result<String> {
        self.queries.lock().unwrap().push(spec.to_string());
        match &self.query_result {
            Ok(output) => Ok(output.clone()),
            Err(message) => Err(Error::ConfigQuery {
                program: spec.to_string(),
                message: message.clone(),
            }),
        }
    }
}
