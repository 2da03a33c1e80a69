//! CSE session-script emission.
//!
//! The script is built by straight string concatenation: the dialect is
//! line-oriented (directive blocks at column 0, embedded code lines behind
//! `!` + tab), so an intermediate syntax tree would buy nothing. Each
//! builder returns one self-contained fragment; `generate` concatenates
//! them in a fixed order. Nothing in this module performs I/O, and nothing
//! here is nondeterministic: a given job always yields byte-identical text.

use crate::config::{Curve, Expression, Root};
use crate::format::{canonicalize_path, format_row, numeric_list, quote_list};

/// Fixed script preamble: interpreter imports and the warnings pragma.
pub const HEADER: &str = concat!(
    "!\tuse Math::Trig;\n",
    "!\tuse File::Basename;\n",
    "!\tuse File::Spec;\n",
    "!\tuse warnings;\n",
    "\n",
);

/// Isentropic compression efficiency subroutine, emitted verbatim.
///
/// Positional arguments: T_total_in, T_total_out, P_total_in, P_total_out.
/// Solves for the isentropic outlet temperature by Newton-Raphson on the
/// entropy balance, using a 5-coefficient cp(T) polynomial curve fit and a
/// 0.1 K absolute convergence tolerance. The iteration runs inside the
/// post-processor when the session is replayed, never here.
pub const EFF_SUBROUTINE: &str = concat!(
    "\n",
    "!\tsub comp_eff\n",
    "!\t{\n",
    "!\t\tmy $a1 = 3.5683962;\n",
    "!\t\tmy $a2 = -0.000678729429;\n",
    "!\t\tmy $a3 = 0.00000155371476;\n",
    "!\t\tmy $a4 = -3.2993706e-12;\n",
    "!\t\tmy $a5 = -4.66395387e-13;\n",
    "!\t\tmy $pi = $_[3]/$_[2];\n",
    "!\t\tmy $c1 = $a1*($_[0]) + $a2*($_[0])**2/2 + $a3*($_[0])**3/3 + $a4*($_[0])**4/4 + $a5*($_[0])**5/5;\n",
    "!\t\tmy $c2 = $a1*($_[1]) + $a2*($_[1])**2/2 + $a3*($_[1])**3/3 + $a4*($_[1])**4/4 + $a5*($_[1])**5/5;\n",
    "!\t\tmy $T3_iz = $_[1];\n",
    "!\t\tmy $T3_iz_prev = $T3_iz + 100;\n",
    "!\t\tmy $i = 1;\n",
    "!\t\twhile (abs ($T3_iz - $T3_iz_prev)>0.1)\n",
    "!\t\t{\n",
    "!\t\t\t$T3_iz_prev = $T3_iz;\n",
    "!\t\t\t$f1 = ($a1/$T3_iz + $a2 + $a3*$T3_iz + $a4*($T3_iz)**2 + $a5*($T3_iz)**3);\n",
    "!\t\t\t$f2 = ($a1*log($T3_iz) + $a2*$T3_iz + $a3*($T3_iz)**2/2 + $a4*($T3_iz)**3/3 + $a5*($T3_iz)**4/4) - ($a1*log($_[0]) + $a2*$_[0] + $a3*$_[0]**2/2 + $a4*$_[0]**3/3 + $a5*$_[0]**4/4) - log($pi);\n",
    "!\t\t\t$T3_iz = $T3_iz - $f2/$f1;\n",
    "!\t\t\t$c2_iz = $a1*($T3_iz) + $a2*($T3_iz)**2/2 + $a3*($T3_iz)**3/3 + $a4*($T3_iz)**4/4 + $a5*($T3_iz)**5/5;\n",
    "!\t\t\t$efficiency = ($c2_iz - $c1)/($c2 - $c1);\n",
    "!\t\t\t$i++;\n",
    "!\t\t};\n",
    "!\treturn $efficiency;\n",
    "!\t};\n",
);

/// Numeric format for every table value, in both passes.
const VALUE_FORMAT: &str = "%.5f";

// ============================================================================
// Statement builders
// ============================================================================

/// `DATA READER` block listing the domains to load, comma-joined and
/// unquoted, in discovery order. Empty domains produce no directive at all.
pub fn gen_domain_load(domains: &[String]) -> String {
    if domains.is_empty() {
        return String::new();
    }
    format!(
        "DATA READER:\n\tDomains to Load = {}\nEND\n\n",
        numeric_list(domains)
    )
}

/// Load one result file, forcing a reload. `file_ref` is a loop variable
/// reference, not a literal path: this is only ever emitted inside a loop.
pub fn gen_file_load(file_ref: &str) -> String {
    format!("> load filename={}, force_reload=true\n", file_ref)
}

/// Refresh the session and bring up the turbo machinery report variables.
pub fn gen_solver_init() -> &'static str {
    "> update\n> turbo init\n> turbo more_vars\n"
}

/// Declare an array variable initialized to a quoted string list.
pub fn gen_array_decl(values: &[String], var: &str) -> String {
    format!("!\tmy @{} = ({});\n", var, quote_list(values))
}

/// Declare-and-bind one line per enabled expression, declaration order
/// preserved. Bodies are passed through untouched; sequential scoping in
/// the dialect lets each line refer to the variables above it.
pub fn gen_variable_decls(expressions: &[Expression]) -> String {
    let mut out = String::new();
    for e in expressions.iter().filter(|e| e.enabled) {
        out.push_str(&format!("!\tmy {} = {};\n", e.variable, e.body));
    }
    out
}

/// Wrap `body` in a foreach loop over `array_var`, binding `loop_var`.
pub fn gen_loop(body: &str, array_var: &str, loop_var: &str) -> String {
    format!(
        "!\tfor my ${} (@{}) {{\n{}!\t}};\n",
        loop_var, array_var, body
    )
}

/// Open `path` for writing, or abort the session.
pub fn gen_open_file(path: &str, handle: &str) -> String {
    format!("!\topen (my ${}, '>', \"{}\") or die;\n", handle, path)
}

/// Printf a pre-built format-and-arguments string to `handle`.
pub fn gen_write_row(format_and_args: &str, handle: &str) -> String {
    format!("!\tprintf (${} {});\n", handle, format_and_args)
}

pub fn gen_close_file(handle: &str) -> String {
    format!("!\tclose(${});\n", handle)
}

/// Per-operating-point metrics for one curve: inlet mass flow, mass-flow
/// averaged total temperature/pressure at inlet and outlet, area-averaged
/// outlet static pressure, the two pressure ratios, and the efficiency
/// subroutine call. Results land in fixed locals consumed by the row write.
pub fn gen_curve_metrics(curve: &Curve) -> String {
    let inlet = &curve.inlet;
    let outlet = &curve.outlet;
    let mut out = String::new();
    out.push_str(&format!("!\tmy $massFlow = massFlow(\"{}\");\n", inlet));
    out.push_str(&format!(
        "!\tmy $T1tot = massFlowAve(\"Total Temperature in Stn Frame\",\"{}\");\n",
        inlet
    ));
    out.push_str(&format!(
        "!\tmy $T3tot = massFlowAve(\"Total Temperature in Stn Frame\",\"{}\");\n",
        outlet
    ));
    out.push_str(&format!(
        "!\tmy $P1tot = massFlowAve(\"Total Pressure in Stn Frame\",\"{}\");\n",
        inlet
    ));
    out.push_str(&format!(
        "!\tmy $P3tot = massFlowAve(\"Total Pressure in Stn Frame\",\"{}\");\n",
        outlet
    ));
    out.push_str(&format!(
        "!\tmy $P3st = areaAve(\"Pressure\", \"{}\");\n",
        outlet
    ));
    out.push_str("!\tmy $Pist = $P3st / $P1tot;\n");
    out.push_str("!\tmy $Pitt = $P3tot / $P1tot;\n");
    out.push_str("!\tmy $eff = comp_eff($T1tot, $T3tot, $P1tot, $P3tot);\n");
    out
}

// ============================================================================
// Script assembler
// ============================================================================

fn quoted(s: &str) -> String {
    format!("\"{}\"", s)
}

fn repeat_spec(spec: &str, n: usize) -> Vec<String> {
    vec![spec.to_string(); n]
}

/// Table path as embedded in the script: canonicalized output directory
/// joined to the table file name with a forward slash.
fn table_path(output_dir: &str, name: &str) -> String {
    let dir = canonicalize_path(output_dir);
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Assemble the whole session script from a validated job.
///
/// Fixed order: header boilerplate, domain load, efficiency subroutine,
/// then the per-file expression pass (only when result files exist), then
/// the performance-map pass (only when curves exist), then the trailer.
/// The subroutine is emitted even when no performance map is present.
pub fn generate(cfg: &Root) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(&gen_domain_load(&cfg.job.domains));
    out.push_str(EFF_SUBROUTINE);

    let enabled = cfg.enabled_expressions();

    if !cfg.job.result_files.is_empty() {
        out.push_str(gen_solver_init());
        out.push_str(&gen_open_file(
            &table_path(&cfg.job.output_dir, &cfg.job.expression_table),
            "FH",
        ));

        let header_cols: Vec<String> =
            enabled.iter().map(|e| quoted(e.header_name())).collect();
        out.push_str(&gen_write_row(
            &format_row(&header_cols, &repeat_spec("%s", header_cols.len())),
            "FH",
        ));

        let files: Vec<String> = cfg
            .job
            .result_files
            .iter()
            .map(|f| canonicalize_path(f))
            .collect();
        out.push_str(&gen_array_decl(&files, "files"));

        let mut body = gen_file_load("$f");
        body.push_str(&gen_variable_decls(&cfg.expressions));
        let row_vals: Vec<String> =
            enabled.iter().map(|e| e.variable.clone()).collect();
        body.push_str(&gen_write_row(
            &format_row(&row_vals, &repeat_spec(VALUE_FORMAT, row_vals.len())),
            "FH",
        ));
        out.push_str(&gen_loop(&body, "files", "f"));
        out.push_str(&gen_close_file("FH"));
    }

    if !cfg.curves.is_empty() {
        // Second independent evaluation pass: the reader needs the domain
        // directive again before these loads.
        out.push_str(&gen_domain_load(&cfg.job.domains));
        out.push_str(gen_solver_init());
        out.push_str(&gen_open_file(
            &table_path(&cfg.job.output_dir, &cfg.job.map_table),
            "PM",
        ));

        let header_cols: Vec<String> =
            ["CurveName", "Inlet", "Outlet", "Gcorr", "Pi_ts", "Pi_tt", "Eff"]
                .iter()
                .map(|&h| quoted(h))
                .collect();
        out.push_str(&gen_write_row(
            &format_row(&header_cols, &repeat_spec("%s", header_cols.len())),
            "PM",
        ));

        for (i, curve) in cfg.curves.iter().enumerate() {
            let array_var = format!("curve{}", i);
            let files: Vec<String> =
                curve.files.iter().map(|f| canonicalize_path(f)).collect();
            out.push_str(&gen_array_decl(&files, &array_var));

            let mut body = gen_file_load("$f");
            body.push_str(&gen_curve_metrics(curve));
            let row_vals = vec![
                quoted(&curve.name),
                quoted(&curve.inlet),
                quoted(&curve.outlet),
                "$massFlow".to_string(),
                "$Pist".to_string(),
                "$Pitt".to_string(),
                "$eff".to_string(),
            ];
            let mut specs = repeat_spec("%s", 3);
            specs.extend(repeat_spec(VALUE_FORMAT, 4));
            body.push_str(&gen_write_row(&format_row(&row_vals, &specs), "PM"));
            out.push_str(&gen_loop(&body, &array_var, "f"));
        }
        out.push_str(&gen_close_file("PM"));
    }

    if !cfg.job.result_files.is_empty() || !cfg.curves.is_empty() {
        out.push_str("> close\n");
    }

    out
}
