//! Mach-O arm64 emitter.
//!
//! Produces a minimal PIE executable: `__PAGEZERO` / `__TEXT` / `__LINKEDIT`
//! segments, a dyld-loader command set, and 32 bytes of slack after the
//! last load command so `codesign` can later insert `LC_CODE_SIGNATURE`
//! without relocating anything that follows.

use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::eval::PrintList;

const PAGE_SIZE: u64 = 16384;
const PAGEZERO_SIZE: u64 = 0x1_0000_0000; // 4 GiB
const TEXT_VADDR: u64 = PAGEZERO_SIZE;
const CODESIGN_SLACK: usize = 32;

const LC_SEGMENT_64: u32 = 0x19;
const LC_LOAD_DYLINKER: u32 = 0x0E;
const LC_MAIN: u32 = 0x28 | 0x8000_0000; // LC_REQ_DYLD
const LC_LOAD_DYLIB: u32 = 0x0C;
const LC_BUILD_VERSION: u32 = 0x32;
const LC_DYLD_CHAINED_FIXUPS: u32 = 0x34 | 0x8000_0000;
const LC_DYLD_EXPORTS_TRIE: u32 = 0x33 | 0x8000_0000;
const LC_SYMTAB: u32 = 0x02;
const LC_DYSYMTAB: u32 = 0x0B;

const MH_EXECUTE: u32 = 2;
const CPU_TYPE_ARM64: i32 = 0x0100_000C;
const CPU_SUBTYPE_ARM64_ALL: i32 = 0;
const VM_PROT_NONE: i32 = 0;
const VM_PROT_READ: i32 = 1;
const VM_PROT_EXEC: i32 = 4;

/// Writes a Mach-O segment name/section name: fixed 16 bytes, NUL-padded.
fn name16(s: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    let bytes = s.as_bytes();
    out[..bytes.len()].copy_from_slice(bytes);
    out
}

fn round_up(value: u64, align: u64) -> u64 {
    (value + align - 1) / align * align
}

pub fn emit(prints: &PrintList) -> CResult<Vec<u8>> {
    // ---- load command bodies (built first so their sizes are known) ----
    let n = prints.len() as u64;
    let write_seq_len: u64 = 20; // adr + 3*movz + svc = 5 * 4 bytes
    let exit_seq_len: u64 = 12; // 2*movz + svc
    let code_len = write_seq_len * n + exit_seq_len;

    let dylinker_path = b"/usr/lib/dyld\0";
    let dylinker_cmdsize = round_up(8 + dylinker_path.len() as u64, 8);
    let dylib_path = b"/usr/lib/libSystem.B.dylib\0";
    let dylib_cmdsize = round_up(24 + dylib_path.len() as u64, 8);

    let segment64_hdr_len = 72u64;
    let section64_len = 80u64;
    let pagezero_cmdsize = segment64_hdr_len;
    let text_cmdsize = segment64_hdr_len + section64_len;
    let linkedit_cmdsize = segment64_hdr_len;
    let main_cmdsize = 24u64;
    let build_version_cmdsize = 24u64; // no tool entries
    let chained_fixups_cmdsize = 16u64;
    let exports_trie_cmdsize = 16u64;
    let symtab_cmdsize = 24u64;
    let dysymtab_cmdsize = 80u64;

    let sizeofcmds = pagezero_cmdsize
        + text_cmdsize
        + linkedit_cmdsize
        + dylinker_cmdsize
        + main_cmdsize
        + build_version_cmdsize
        + dylib_cmdsize
        + chained_fixups_cmdsize
        + exports_trie_cmdsize
        + symtab_cmdsize
        + dysymtab_cmdsize;
    let ncmds = 11u32;

    let mach_header_len = 32u64;
    let code_start = mach_header_len + sizeofcmds + CODESIGN_SLACK as u64;

    let mut offsets = Vec::with_capacity(prints.len());
    let mut running = code_start + code_len;
    for buf in prints.iter() {
        offsets.push(running);
        running += buf.len() as u64;
    }
    let text_filesize = running;
    let text_vmsize = round_up(text_filesize, PAGE_SIZE);

    // __LINKEDIT: chained-fixups stub (48 bytes, three empty segment infos)
    // followed by the 8-byte empty exports trie.
    let linkedit_fileoff = round_up(text_filesize, PAGE_SIZE);
    let chained_fixups_off = linkedit_fileoff;
    let chained_fixups_size = 48u64;
    let exports_trie_off = chained_fixups_off + chained_fixups_size;
    let exports_trie_size = 8u64;
    let linkedit_filesize = chained_fixups_size + exports_trie_size;
    let linkedit_vmaddr = TEXT_VADDR + text_vmsize;
    let linkedit_vmsize = round_up(linkedit_filesize, PAGE_SIZE);

    let file_size = linkedit_fileoff + linkedit_filesize;
    let entry_off = code_start;

    let mut out = Vec::with_capacity(file_size as usize);

    // ---- mach_header_64 ----
    out.extend_from_slice(&0xFEED_FACFu32.to_le_bytes());
    out.extend_from_slice(&CPU_TYPE_ARM64.to_le_bytes());
    out.extend_from_slice(&CPU_SUBTYPE_ARM64_ALL.to_le_bytes());
    out.extend_from_slice(&MH_EXECUTE.to_le_bytes());
    out.extend_from_slice(&ncmds.to_le_bytes());
    out.extend_from_slice(&(sizeofcmds as u32).to_le_bytes());
    out.extend_from_slice(&0x0020_0085u32.to_le_bytes()); // NOUNDEFS|DYLDLINK|TWOLEVEL|PIE
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    debug_assert_eq!(out.len() as u64, mach_header_len);

    // ---- LC_SEGMENT_64 __PAGEZERO ----
    write_segment64(&mut out, "__PAGEZERO", 0, PAGEZERO_SIZE, 0, 0, VM_PROT_NONE, VM_PROT_NONE, 0);

    // ---- LC_SEGMENT_64 __TEXT (one __text section covering the header page) ----
    out.extend_from_slice(&LC_SEGMENT_64.to_le_bytes());
    out.extend_from_slice(&(text_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&name16("__TEXT"));
    out.extend_from_slice(&TEXT_VADDR.to_le_bytes());
    out.extend_from_slice(&text_vmsize.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes()); // fileoff
    out.extend_from_slice(&text_filesize.to_le_bytes());
    out.extend_from_slice(&(VM_PROT_READ | VM_PROT_EXEC).to_le_bytes());
    out.extend_from_slice(&(VM_PROT_READ | VM_PROT_EXEC).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // nsects
    out.extend_from_slice(&0u32.to_le_bytes()); // flags
    // section_64 __text
    out.extend_from_slice(&name16("__text"));
    out.extend_from_slice(&name16("__TEXT"));
    out.extend_from_slice(&TEXT_VADDR.to_le_bytes());
    out.extend_from_slice(&text_filesize.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // offset: section covers the header page, starts at file offset 0
    out.extend_from_slice(&2u32.to_le_bytes()); // align = 2^2 = 4 bytes (arm64 instruction width)
    out.extend_from_slice(&0u32.to_le_bytes()); // reloff
    out.extend_from_slice(&0u32.to_le_bytes()); // nreloc
    out.extend_from_slice(&0x8000_0400u32.to_le_bytes()); // S_ATTR_SOME_INSTRUCTIONS|S_ATTR_PURE_INSTRUCTIONS
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved1
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved2
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved3

    // ---- LC_SEGMENT_64 __LINKEDIT ----
    write_segment64(&mut out, "__LINKEDIT", linkedit_vmaddr, linkedit_vmsize, linkedit_fileoff, linkedit_filesize, VM_PROT_READ, VM_PROT_READ, 0);

    // ---- LC_LOAD_DYLINKER ----
    out.extend_from_slice(&LC_LOAD_DYLINKER.to_le_bytes());
    out.extend_from_slice(&(dylinker_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&12u32.to_le_bytes()); // name offset within this command
    pad_cstring(&mut out, dylinker_path, dylinker_cmdsize - 12);

    // ---- LC_MAIN ----
    out.extend_from_slice(&LC_MAIN.to_le_bytes());
    out.extend_from_slice(&(main_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&entry_off.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes()); // stacksize (0 = default)

    // ---- LC_BUILD_VERSION (platform macOS, minos 14.0, no tool entries) ----
    out.extend_from_slice(&LC_BUILD_VERSION.to_le_bytes());
    out.extend_from_slice(&(build_version_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // PLATFORM_MACOS
    out.extend_from_slice(&encode_version(14, 0, 0).to_le_bytes()); // minos 14.0
    out.extend_from_slice(&encode_version(14, 0, 0).to_le_bytes()); // sdk
    out.extend_from_slice(&0u32.to_le_bytes()); // ntools

    // ---- LC_LOAD_DYLIB libSystem ----
    out.extend_from_slice(&LC_LOAD_DYLIB.to_le_bytes());
    out.extend_from_slice(&(dylib_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&24u32.to_le_bytes()); // name offset
    out.extend_from_slice(&2u32.to_le_bytes()); // timestamp (fixed so every build is byte-identical)
    out.extend_from_slice(&encode_version(1, 0, 0).to_le_bytes()); // current_version
    out.extend_from_slice(&encode_version(1, 0, 0).to_le_bytes()); // compatibility_version
    pad_cstring(&mut out, dylib_path, dylib_cmdsize - 24);

    // ---- LC_DYLD_CHAINED_FIXUPS (empty stub, data lives in __LINKEDIT) ----
    out.extend_from_slice(&LC_DYLD_CHAINED_FIXUPS.to_le_bytes());
    out.extend_from_slice(&(chained_fixups_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&(chained_fixups_off as u32).to_le_bytes());
    out.extend_from_slice(&(chained_fixups_size as u32).to_le_bytes());

    // ---- LC_DYLD_EXPORTS_TRIE (8-byte empty trie) ----
    out.extend_from_slice(&LC_DYLD_EXPORTS_TRIE.to_le_bytes());
    out.extend_from_slice(&(exports_trie_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&(exports_trie_off as u32).to_le_bytes());
    out.extend_from_slice(&(exports_trie_size as u32).to_le_bytes());

    // ---- LC_SYMTAB (empty) ----
    out.extend_from_slice(&LC_SYMTAB.to_le_bytes());
    out.extend_from_slice(&(symtab_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&(file_size as u32).to_le_bytes()); // symoff (past end; nsyms=0)
    out.extend_from_slice(&0u32.to_le_bytes()); // nsyms
    out.extend_from_slice(&(file_size as u32).to_le_bytes()); // stroff
    out.extend_from_slice(&0u32.to_le_bytes()); // strsize

    // ---- LC_DYSYMTAB (empty) ----
    out.extend_from_slice(&LC_DYSYMTAB.to_le_bytes());
    out.extend_from_slice(&(dysymtab_cmdsize as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 72]); // all-zero: no symbol table subranges

    debug_assert_eq!(out.len() as u64, mach_header_len + sizeofcmds);

    out.resize(code_start as usize, 0); // codesign slack

    for (i, buf) in prints.iter().enumerate() {
        let instr_addr = TEXT_VADDR + code_start + write_seq_len * i as u64;
        let target = TEXT_VADDR + offsets[i];
        write_sys_write(&mut out, target, instr_addr, buf.len() as u32)?;
    }
    write_exit(&mut out);

    for buf in prints.iter() {
        out.extend_from_slice(buf);
    }
    out.resize(linkedit_fileoff as usize, 0);

    // Chained-fixups stub: a 48-byte header declaring zero imports, with
    // zero page-starts/fixups for all three segments.
    out.extend_from_slice(&1u32.to_le_bytes()); // fixups_version
    out.extend_from_slice(&0u32.to_le_bytes()); // starts_offset (none)
    out.extend_from_slice(&0u32.to_le_bytes()); // imports_offset
    out.extend_from_slice(&0u32.to_le_bytes()); // symbols_offset
    out.extend_from_slice(&0u32.to_le_bytes()); // imports_count
    out.extend_from_slice(&0u32.to_le_bytes()); // imports_format
    out.extend_from_slice(&0u32.to_le_bytes()); // symbols_format
    out.extend_from_slice(&[0u8; 20]); // padding to 48 bytes total

    // Exports trie: a single zero-length-children root node.
    out.extend_from_slice(&[0u8; 8]);

    debug_assert_eq!(out.len() as u64, file_size);
    Ok(out)
}

fn encode_version(major: u32, minor: u32, patch: u32) -> u32 {
    (major << 16) | (minor << 8) | patch
}

#[allow(clippy::too_many_arguments)]
fn write_segment64(out: &mut Vec<u8>, name: &str, vmaddr: u64, vmsize: u64, fileoff: u64, filesize: u64, maxprot: i32, initprot: i32, nsects: u32) {
    out.extend_from_slice(&LC_SEGMENT_64.to_le_bytes());
    out.extend_from_slice(&72u32.to_le_bytes());
    out.extend_from_slice(&name16(name));
    out.extend_from_slice(&vmaddr.to_le_bytes());
    out.extend_from_slice(&vmsize.to_le_bytes());
    out.extend_from_slice(&fileoff.to_le_bytes());
    out.extend_from_slice(&filesize.to_le_bytes());
    out.extend_from_slice(&maxprot.to_le_bytes());
    out.extend_from_slice(&initprot.to_le_bytes());
    out.extend_from_slice(&nsects.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // flags
}

fn pad_cstring(out: &mut Vec<u8>, s: &[u8], total_len: u64) {
    out.extend_from_slice(s);
    let pad = total_len as usize - s.len();
    out.extend(std::iter::repeat(0u8).take(pad));
}

/// `adr x1, &str; movz x0, #1; movz x2, #len; movz x16, #4; svc #0x80` (20 bytes).
///
/// `adr`'s immediate only reaches `±1 MiB`; beyond that is a fatal emitter
/// error rather than silently mis-encoding or switching to `adrp`+`add`.
fn write_sys_write(out: &mut Vec<u8>, target: u64, instr_addr: u64, len: u32) -> CResult<()> {
    let disp = target as i64 - instr_addr as i64;
    if !(-(1 << 20)..(1 << 20)).contains(&disp) {
        return Err(Diagnostic::error(SourceLoc::default(), "string displacement exceeds arm64 'adr' ±1 MiB range"));
    }
    let disp = disp as u32;
    let immlo = disp & 0b11;
    let immhi = (disp >> 2) & 0x7_FFFF;
    let adr: u32 = 0x1000_0001 | (immlo << 29) | (immhi << 5);
    out.extend_from_slice(&adr.to_le_bytes());
    out.extend_from_slice(&movz(0, 1).to_le_bytes());
    out.extend_from_slice(&movz(2, len).to_le_bytes());
    out.extend_from_slice(&movz(16, 4).to_le_bytes());
    out.extend_from_slice(&0xD400_0001u32.to_le_bytes()); // svc #0x80
    Ok(())
}

/// `movz x0,#0; movz x16,#1; svc #0x80` (12 bytes).
fn write_exit(out: &mut Vec<u8>) {
    out.extend_from_slice(&movz(0, 0).to_le_bytes());
    out.extend_from_slice(&movz(16, 1).to_le_bytes());
    out.extend_from_slice(&0xD400_0001u32.to_le_bytes());
}

/// Encodes `movz x{reg}, #{imm}` (imm must fit in 16 bits).
fn movz(reg: u32, imm: u32) -> u32 {
    0xD280_0000 | (imm << 5) | reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_magic_is_macho64_little_endian() {
        let mut prints = PrintList::new();
        prints.push(b"hi\n".to_vec());
        let bytes = emit(&prints).unwrap();
        assert_eq!(&bytes[0..4], &0xFEED_FACFu32.to_le_bytes());
    }

    #[test]
    fn oversized_displacement_is_a_fatal_emitter_error() {
        let mut prints = PrintList::new();
        prints.push(vec![0u8; 3_000_000]);
        prints.push(b"too far".to_vec());
        assert!(emit(&prints).is_err());
    }
}
