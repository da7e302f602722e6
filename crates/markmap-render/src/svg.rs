use crate::layout::TOGGLE_RADIUS;
use crate::markmap::Markmap;
use crate::model::LayoutNode;
use std::fmt::Write as _;

fn fmt(v: f64) -> String {
    // Round-trippable decimal form, minus `-0` and float noise from layout arithmetic.
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    format!("{v}")
}

fn escape_attr(text: &str) -> String {
    htmlize::escape_attribute(text).into_owned()
}

fn escape_text(text: &str) -> String {
    htmlize::escape_text(text).into_owned()
}

/// Surface content for `mm`: one transformed `<g class="markmap-root">` holding links and nodes.
pub fn render_markup(mm: &Markmap) -> String {
    let layout = mm.layout();
    let opts = mm.options();
    let t = mm.transform();
    let mut out = String::new();

    let _ = writeln!(
        &mut out,
        r#"<g class="markmap-root" transform="translate({},{}) scale({})" style="transition: transform {}ms">"#,
        fmt(t.x),
        fmt(t.y),
        fmt(t.k),
        opts.duration
    );

    for e in &layout.edges {
        let [a, b, c, d] = e.points.as_slice() else {
            continue;
        };
        let _ = writeln!(
            &mut out,
            r#"<path class="markmap-link" data-from="{}" data-to="{}" stroke="{}" fill="none" d="M{},{}C{},{},{},{},{},{}"/>"#,
            e.from,
            e.to,
            escape_attr(&e.color),
            fmt(a.x),
            fmt(a.y),
            fmt(b.x),
            fmt(b.y),
            fmt(c.x),
            fmt(c.y),
            fmt(d.x),
            fmt(d.y)
        );
    }

    for n in &layout.nodes {
        render_node(&mut out, mm, n);
    }

    out.push_str("</g>\n");
    out
}

fn render_node(out: &mut String, mm: &Markmap, n: &LayoutNode) {
    let html_labels = mm.options().html_labels;
    let color = escape_attr(&n.color);
    let _ = writeln!(
        out,
        r#"<g class="markmap-node" data-node-id="{}" data-depth="{}" data-interactive="{}">"#,
        n.id, n.depth, html_labels
    );
    let _ = writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}"/>"#,
        fmt(n.x),
        fmt(n.y + n.height),
        fmt(n.x + n.width),
        fmt(n.y + n.height),
        color
    );

    if html_labels {
        let _ = writeln!(
            out,
            r#"<foreignObject x="{}" y="{}" width="{}" height="{}"><div xmlns="http://www.w3.org/1999/xhtml" class="markmap-label">{}</div></foreignObject>"#,
            fmt(n.x),
            fmt(n.y),
            fmt(n.width),
            fmt(n.height),
            mm.tree().node(n.id).content
        );
    } else {
        let line_height = if n.lines.is_empty() {
            0.0
        } else {
            (n.height - crate::layout::NODE_PADDING * 2.0) / n.lines.len() as f64
        };
        let _ = write!(out, r#"<text x="{}" y="{}">"#, fmt(n.x), fmt(n.y));
        for (i, line) in n.lines.iter().enumerate() {
            let _ = write!(
                out,
                r#"<tspan x="{}" y="{}">{}</tspan>"#,
                fmt(n.x + crate::layout::NODE_PADDING),
                fmt(n.y + crate::layout::NODE_PADDING + line_height * (i as f64 + 0.8)),
                escape_text(line)
            );
        }
        out.push_str("</text>\n");
    }

    if let Some(c) = n.toggle_center() {
        let fill = if n.folded { color.as_str() } else { "#fff" };
        let _ = writeln!(
            out,
            r#"<circle class="markmap-toggle" cx="{}" cy="{}" r="{}" stroke="{}" fill="{}"/>"#,
            fmt(c.x),
            fmt(c.y),
            fmt(TOGGLE_RADIUS),
            color,
            fill
        );
    }
    out.push_str("</g>\n");
}

/// Standalone SVG document sized to the surface. Used for snapshots and static export.
pub fn render_svg_document(mm: &Markmap, diagram_id: &str) -> String {
    let vp = mm.viewport();
    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" class="markmap" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        escape_attr(diagram_id),
        fmt(vp.width),
        fmt(vp.height),
        fmt(vp.width),
        fmt(vp.height)
    );
    out.push_str(&render_markup(mm));
    out.push_str("</svg>\n");
    out
}
