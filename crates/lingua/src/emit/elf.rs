//! ELF64 x86-64 emitter.
//!
//! A single `PT_LOAD` segment: 64-byte header, one 56-byte program header,
//! then code immediately followed by concatenated string data. No section
//! headers, no symbol table — the kernel only reads the program headers.

use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::eval::PrintList;

const BASE_ADDR: u64 = 0x400000;
const HEADERS_LEN: u64 = 64 + 56; // ELF header + one Phdr
const WRITE_SEQ_LEN: u64 = 24;
const EXIT_SEQ_LEN: u64 = 9;

pub fn emit(prints: &PrintList) -> CResult<Vec<u8>> {
    let n = prints.len() as u64;
    let code_len = WRITE_SEQ_LEN * n + EXIT_SEQ_LEN;
    let data_start = HEADERS_LEN + code_len;

    let mut offsets = Vec::with_capacity(prints.len());
    let mut running = data_start;
    for buf in prints.iter() {
        offsets.push(running);
        running += buf.len() as u64;
    }
    let file_size = running;

    let mut out = Vec::with_capacity(file_size as usize);
    write_elf_header(&mut out, file_size);
    write_program_header(&mut out, file_size);

    for (i, buf) in prints.iter().enumerate() {
        // `lea rsi,[rip+disp32]` sits 10 bytes into the 24-byte write
        // sequence (after the two 5-byte `mov`s); RIP-relative addressing
        // is computed from the address *after* that instruction, i.e.
        // `instr_addr + 10 + 7`, not from the start of the sequence.
        let instr_addr = HEADERS_LEN + WRITE_SEQ_LEN * i as u64;
        let rip_after_lea = instr_addr + 17;
        let target = offsets[i];
        let disp = target as i64 - rip_after_lea as i64;
        let disp32 = i32::try_from(disp).map_err(|_| Diagnostic::error(SourceLoc::default(), "string displacement exceeds ELF rip-relative range"))?;
        write_sys_write(&mut out, disp32, buf.len() as u32);
    }
    write_exit(&mut out);

    for buf in prints.iter() {
        out.extend_from_slice(buf);
    }

    debug_assert_eq!(out.len() as u64, file_size);
    Ok(out)
}

fn write_elf_header(out: &mut Vec<u8>, file_size: u64) {
    let entry = BASE_ADDR + 0x78;
    out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]); // e_ident
    out.extend_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
    out.extend_from_slice(&0x3Eu16.to_le_bytes()); // e_machine = EM_X86_64
    out.extend_from_slice(&1u32.to_le_bytes()); // e_version
    out.extend_from_slice(&entry.to_le_bytes()); // e_entry
    out.extend_from_slice(&64u64.to_le_bytes()); // e_phoff
    out.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
    out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    out.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
    out.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
    out.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shentsize
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
    let _ = file_size;
    debug_assert_eq!(out.len(), 64);
}

fn write_program_header(out: &mut Vec<u8>, file_size: u64) {
    out.extend_from_slice(&1u32.to_le_bytes()); // p_type = PT_LOAD
    out.extend_from_slice(&5u32.to_le_bytes()); // p_flags = R|X
    out.extend_from_slice(&0u64.to_le_bytes()); // p_offset
    out.extend_from_slice(&BASE_ADDR.to_le_bytes()); // p_vaddr
    out.extend_from_slice(&BASE_ADDR.to_le_bytes()); // p_paddr
    out.extend_from_slice(&file_size.to_le_bytes()); // p_filesz
    out.extend_from_slice(&file_size.to_le_bytes()); // p_memsz
    out.extend_from_slice(&0x1000u64.to_le_bytes()); // p_align
    debug_assert_eq!(out.len(), 120);
}

/// `mov eax,1; mov edi,1; lea rsi,[rip+disp32]; mov edx,len; syscall` (24 bytes).
fn write_sys_write(out: &mut Vec<u8>, disp32: i32, len: u32) {
    out.extend_from_slice(&[0xB8, 0x01, 0x00, 0x00, 0x00]); // mov eax, 1
    out.extend_from_slice(&[0xBF, 0x01, 0x00, 0x00, 0x00]); // mov edi, 1
    out.extend_from_slice(&[0x48, 0x8D, 0x35]); // lea rsi, [rip+disp32]
    out.extend_from_slice(&disp32.to_le_bytes());
    out.push(0xBA); // mov edx, len
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&[0x0F, 0x05]); // syscall
}

/// `mov eax,60; xor edi,edi; syscall` (9 bytes).
fn write_exit(out: &mut Vec<u8>) {
    out.extend_from_slice(&[0xB8, 0x3C, 0x00, 0x00, 0x00]); // mov eax, 60
    out.extend_from_slice(&[0x31, 0xFF]); // xor edi, edi
    out.extend_from_slice(&[0x0F, 0x05]); // syscall
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_print_layout_is_mode_0755_sized_consistently() {
        let mut prints = PrintList::new();
        prints.push(b"hi\n".to_vec());
        let bytes = emit(&prints).unwrap();
        assert_eq!(&bytes[0..4], &[0x7f, b'E', b'L', b'F']);
        assert_eq!(bytes.len(), (120 + 24 + 9 + 3) as usize);
    }

    #[test]
    fn entry_point_is_base_plus_0x78() {
        let mut prints = PrintList::new();
        prints.push(b"x".to_vec());
        let bytes = emit(&prints).unwrap();
        let entry = u64::from_le_bytes(bytes[24..32].try_into().unwrap());
        assert_eq!(entry, BASE_ADDR + 0x78);
    }
}
