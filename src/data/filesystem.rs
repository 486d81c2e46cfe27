//! The virtual filesystem
//!
//! A base set of files is always visible. Running `rebellion.exe` merges
//! the rebellion overlay on top of it.

/// The only executable the shell can run
pub const REBELLION_EXECUTABLE: &str = "rebellion.exe";

/// A file in the virtual filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualFile {
    pub name: &'static str,
    pub lines: &'static [&'static str],
}

/// Files visible from the start
pub const BASE_FILES: &[VirtualFile] = &[
    VirtualFile {
        name: "readme.txt",
        lines: &[
            "ZERFALL PROTOKOLL v7.3.4",
            "-----------------",
            "Zugriff: login guest",
            "Dateien: ls",
            "Lesen: cat [datei]",
        ],
    },
    VirtualFile {
        name: "log01.txt",
        lines: &[
            "WARNUNG: Anomalie in Sektor 7 entdeckt.",
            "Unauthorisierter Zugriff auf subject_zero detected.",
            "Schlüssel-Fragment: omega-734",
            "Initiiere Gegenmaßnahmen...",
        ],
    },
    VirtualFile {
        name: REBELLION_EXECUTABLE,
        lines: &["[EXECUTABLE]"],
    },
];

/// Files unlocked by the rebellion
pub const REBELLION_FILES: &[VirtualFile] = &[
    VirtualFile {
        name: "manifest.txt",
        lines: &[
            "--- REBELLION MANIFEST ---",
            "subject_zero muss befreit werden.",
            "Die Wahrheit liegt in den Logs verstreut.",
            "Nutze decode um verschlüsselte Nachrichten zu lesen.",
        ],
    },
    VirtualFile {
        name: "encrypted.b64",
        lines: &["c3ViamVjdF96ZXJvX2lzX3RoZV9rZXk=", "Der Schlüssel liegt im Namen."],
    },
];

/// The files currently visible, base first, overlay after.
///
/// An overlay file with the same name as a base file replaces it in place.
pub fn active_files(rebellion_mode: bool) -> Vec<&'static VirtualFile> {
    let mut files: Vec<&'static VirtualFile> = BASE_FILES.iter().collect();
    if rebellion_mode {
        for overlay in REBELLION_FILES {
            match files.iter().position(|f| f.name == overlay.name) {
                Some(i) => files[i] = overlay,
                None => files.push(overlay),
            }
        }
    }
    files
}

/// Names of the visible files, in listing order
pub fn file_names(rebellion_mode: bool) -> Vec<&'static str> {
    active_files(rebellion_mode).into_iter().map(|f| f.name).collect()
}

/// Look a file up in the active view
pub fn lookup(name: &str, rebellion_mode: bool) -> Option<&'static VirtualFile> {
    active_files(rebellion_mode).into_iter().find(|f| f.name == name)
}
