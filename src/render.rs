use std::fmt::Write;

use crate::paginate::PageLink;
use crate::record::{Listable, Status, Vertical};
use crate::sort::SortKey;
use crate::url_state::{self, ListingState};
use crate::view::{ListingView, ViewStatus};

/// Seconds before a loading placeholder re-requests the page.
const LOADING_REFRESH_SECS: u32 = 2;
const PLACEHOLDER: &str = "—";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn format_amount(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("₹{v:.0}")
    } else {
        format!("₹{v:.2}")
    }
}

fn page_shell(title: &str, body: &str, refresh_secs: Option<u32>) -> String {
    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if let Some(secs) = refresh_secs {
        let _ = writeln!(out, "<meta http-equiv=\"refresh\" content=\"{secs}\">");
    }
    let _ = writeln!(out, "<title>{} | Care Directory</title>", escape(title));
    out.push_str("</head>\n<body>\n");
    out.push_str(&site_nav());
    out.push_str(body);
    out.push_str("</body>\n</html>\n");
    out
}

fn site_nav() -> String {
    let mut out = String::from("<header class=\"site-header\"><nav><a href=\"/\">Care Directory</a>");
    for v in Vertical::ALL {
        let _ = write!(out, " <a href=\"/{}\">{}</a>", v.slug(), escape(v.title()));
    }
    out.push_str("</nav></header>\n");
    out
}

pub fn render_index() -> String {
    let mut body = String::from("<main class=\"index\">\n<h1>Find care near you</h1>\n<ul class=\"verticals\">\n");
    for v in Vertical::ALL {
        let _ = writeln!(
            body,
            "<li><a href=\"/{}\">{}</a></li>",
            v.slug(),
            escape(v.title())
        );
    }
    body.push_str("</ul>\n</main>\n");
    page_shell("Home", &body, None)
}

pub fn render_not_found() -> String {
    page_shell(
        "Not found",
        "<main class=\"not-found\"><h1>Page not found</h1><p><a href=\"/\">Back to the directory</a></p></main>\n",
        None,
    )
}

/// Full HTML page for one listing request.
pub fn render_listing<R: Listable>(
    view: &ListingView<'_, R>,
    page_size: usize,
    debounce_ms: u64,
) -> String {
    let vertical = view.vertical;
    let mut body = String::with_capacity(16 * 1024);
    let _ = writeln!(body, "<main class=\"listing listing-{}\">", vertical.slug());
    let _ = writeln!(body, "<h1>{}</h1>", escape(vertical.title()));
    body.push_str(&filter_form(view, debounce_ms));

    match view.status {
        ViewStatus::Loading => {
            let _ = writeln!(
                body,
                "<div class=\"listing-status loading\" role=\"status\">Loading {}…</div>",
                vertical.noun()
            );
        }
        ViewStatus::Unavailable => {
            let _ = writeln!(
                body,
                "<div class=\"listing-status unavailable\" role=\"status\">We couldn't load {} right now. Please try again shortly.</div>",
                vertical.noun()
            );
        }
        ViewStatus::NoResults if view.state.filter.is_empty() => {
            let _ = writeln!(
                body,
                "<div class=\"listing-status no-results\" role=\"status\">No {} are listed yet.</div>",
                vertical.noun()
            );
        }
        ViewStatus::NoResults => {
            let _ = writeln!(
                body,
                "<div class=\"listing-status no-results\" role=\"status\">No {} match your search. <a href=\"/{}\">Clear filters</a></div>",
                vertical.noun(),
                vertical.slug()
            );
        }
        ViewStatus::Results => {
            if let Some((first, last)) = view.item_range(page_size) {
                let _ = writeln!(
                    body,
                    "<p class=\"result-count\">Showing {first}–{last} of {} {}</p>",
                    view.total_results,
                    vertical.noun()
                );
            }
            body.push_str("<ul class=\"results\">\n");
            for item in &view.items {
                body.push_str(&card(*item));
            }
            body.push_str("</ul>\n");
            body.push_str(&pagination(vertical, &view.state, view.total_pages, &view.window));
        }
    }

    body.push_str("</main>\n");
    let _ = writeln!(body, "<script>{}</script>", SEARCH_SCRIPT);

    let refresh = (view.status == ViewStatus::Loading).then_some(LOADING_REFRESH_SECS);
    page_shell(vertical.title(), &body, refresh)
}

fn select(
    out: &mut String,
    name: &str,
    label: &str,
    any_label: &str,
    options: &[String],
    current: Option<&str>,
) {
    let _ = write!(
        out,
        "<label>{} <select name=\"{}\"><option value=\"\">{}</option>",
        escape(label),
        escape(name),
        escape(any_label)
    );
    let mut seen_current = false;
    for opt in options {
        let selected = current.is_some_and(|c| c.eq_ignore_ascii_case(opt));
        seen_current |= selected;
        let _ = write!(
            out,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(opt),
            if selected { " selected" } else { "" }
        );
    }
    // keep a URL-supplied value visible even if no record carries it
    if let Some(c) = current.filter(|_| !seen_current) {
        let _ = write!(out, "<option value=\"{0}\" selected>{0}</option>", escape(c));
    }
    out.push_str("</select></label>\n");
}

fn filter_form<R>(view: &ListingView<'_, R>, debounce_ms: u64) -> String {
    let vertical = view.vertical;
    let filter = &view.state.filter;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<form class=\"listing-filters\" method=\"get\" action=\"/{}\" data-debounce-ms=\"{}\" role=\"search\">",
        vertical.slug(),
        debounce_ms
    );
    let _ = writeln!(
        out,
        "<input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search {}\" autocomplete=\"off\">",
        escape(filter.query.as_deref().unwrap_or("")),
        vertical.noun()
    );
    select(
        &mut out,
        vertical.category_param(),
        vertical.category_label(),
        "All",
        &view.categories,
        filter.category.as_deref(),
    );
    select(
        &mut out,
        "location",
        "Location",
        "Anywhere",
        &view.locations,
        filter.location.as_deref(),
    );
    out.push_str("<label>Sort <select name=\"sort\">");
    for key in SortKey::ALL {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            key.as_str(),
            if key == view.state.sort { " selected" } else { "" },
            escape(key.label())
        );
    }
    out.push_str("</select></label>\n<button type=\"submit\">Search</button>\n</form>\n");
    out
}

fn card<R: Listable>(r: &R) -> String {
    let mut out = String::new();
    let _ = write!(out, "<li class=\"card\" data-id=\"{}\">", escape(r.id()));
    match r.core().image.as_deref() {
        Some(src) => {
            let _ = write!(
                out,
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape(src),
                escape(r.display_name().unwrap_or(""))
            );
        }
        None => out.push_str("<div class=\"card-image placeholder\" aria-hidden=\"true\"></div>"),
    }
    let _ = write!(
        out,
        "<h2>{}</h2>",
        escape(r.display_name().unwrap_or(PLACEHOLDER))
    );
    let _ = write!(
        out,
        "<p class=\"category\">{}</p>",
        escape(r.category().unwrap_or(PLACEHOLDER))
    );
    let location = r.location();
    let place = location.summary();
    let _ = write!(
        out,
        "<p class=\"location\">{}</p>",
        escape(place.as_deref().unwrap_or(PLACEHOLDER))
    );
    if let Some(addr) = location.address.as_deref() {
        let _ = write!(out, "<p class=\"address\">{}</p>", escape(addr));
    }
    match r.rating() {
        Some(rating) => {
            let _ = write!(out, "<p class=\"rating\">★ {rating:.1}</p>");
        }
        None => out.push_str("<p class=\"rating unrated\">Not rated yet</p>"),
    }
    if let Some(fee) = r.fee() {
        let _ = write!(out, "<p class=\"fee\">{}</p>", format_amount(fee));
    }
    let highlights = r.highlights();
    if !highlights.is_empty() {
        out.push_str("<ul class=\"highlights\">");
        for h in &highlights {
            let _ = write!(out, "<li>{}</li>", escape(h));
        }
        out.push_str("</ul>");
    }
    if r.core().status == Status::Inactive {
        out.push_str("<span class=\"badge inactive\">Currently unavailable</span>");
    }
    out.push_str("</li>\n");
    out
}

fn pagination(
    vertical: Vertical,
    state: &ListingState,
    total_pages: usize,
    window: &[PageLink],
) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let mut out = String::from("<nav class=\"pagination\" aria-label=\"Pages\">");
    if state.page > 1 {
        let _ = write!(
            out,
            "<a rel=\"prev\" href=\"{}\">Previous</a>",
            escape(&url_state::href(vertical, &state.with_page(state.page - 1)))
        );
    }
    for link in window {
        match link {
            PageLink::Number(n) if *n == state.page => {
                let _ = write!(out, "<span aria-current=\"page\">{n}</span>");
            }
            PageLink::Number(n) => {
                let _ = write!(
                    out,
                    "<a href=\"{}\">{n}</a>",
                    escape(&url_state::href(vertical, &state.with_page(*n)))
                );
            }
            PageLink::Gap => out.push_str("<span class=\"gap\">…</span>"),
        }
    }
    if state.page < total_pages {
        let _ = write!(
            out,
            "<a rel=\"next\" href=\"{}\">Next</a>",
            escape(&url_state::href(vertical, &state.with_page(state.page + 1)))
        );
    }
    out.push_str("</nav>\n");
    out
}

/// Builds canonical URLs from the filter form and navigates with a new history
/// entry. Typing in the search box waits `data-debounce-ms` before navigating.
const SEARCH_SCRIPT: &str = r#"(function () {
  var form = document.querySelector("form.listing-filters");
  if (!form) return;
  var wait = parseInt(form.dataset.debounceMs, 10) || 300;
  var timer = null;
  function go() {
    var params = new URLSearchParams();
    new FormData(form).forEach(function (value, key) {
      value = String(value).trim();
      if (value && !(key === "sort" && value === "rating")) params.append(key, value);
    });
    var qs = params.toString();
    var url = form.getAttribute("action") + (qs ? "?" + qs : "");
    if (url !== location.pathname + location.search) location.assign(url);
  }
  form.addEventListener("submit", function (e) { e.preventDefault(); clearTimeout(timer); go(); });
  form.querySelectorAll("select").forEach(function (s) {
    s.addEventListener("change", function () { clearTimeout(timer); go(); });
  });
  var q = form.querySelector("input[name=q]");
  if (q) q.addEventListener("input", function () { clearTimeout(timer); timer = setTimeout(go, wait); });
})();"#;
