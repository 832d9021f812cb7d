//! HTML pages rendered with Handlebars. Strict mode is on so every field a
//! template reads must be present in its context (use `null` for none), and
//! values are HTML escaped by default.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug, Clone, Copy)]
pub enum Page {
    Login,
    Day,
    Month,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const LAYOUT_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}} | Calendar Tracking</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: .4rem; vertical-align: top; }
.muted { color: #888; }
.error { color: #b00020; }
.month td { height: 6rem; width: 14%; }
</style>
</head>
<body>"#;

const LOGIN_PAGE: &str = r#"{{> head}}
<h1>Calendar Tracking</h1>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
<form method="post" action="/login">
  <label>Email <input type="email" name="email" value="{{email}}" required></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#;

const DAY_PAGE: &str = r#"{{> head}}
<nav>Signed in as {{admin_name}} | <a href="/logout">Log out</a></nav>
<h1>{{date_label}}</h1>
<form method="get" action="/admin/calendar/page">
  <a href="/admin/calendar/page?date={{prev_date}}">&laquo; Previous day</a>
  <input type="date" name="date" value="{{date}}">
  <button type="submit">Go</button>
  <a href="/admin/calendar/page?date={{next_date}}">Next day &raquo;</a>
</form>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
<table>
  <thead><tr><th>User</th><th>Busy</th><th>Free</th></tr></thead>
  <tbody>
  {{#each rows}}
  <tr>
    <td><a href="{{{detail_url}}}">{{#if name}}{{name}} ({{email}}){{else}}{{email}}{{/if}}</a></td>
    {{#if error}}
    <td colspan="2" class="error">{{error}}</td>
    {{else}}
    <td>{{#each busy}}<div>{{this}}</div>{{else}}<span class="muted">{{busy_text}}</span>{{/each}}</td>
    <td>{{free}}</td>
    {{/if}}
  </tr>
  {{else}}
  <tr><td colspan="3" class="muted">No configured users.</td></tr>
  {{/each}}
  </tbody>
</table>
</body>
</html>
"#;

const MONTH_PAGE: &str = r#"{{> head}}
<nav><a href="/admin/calendar/page">&laquo; All users</a> | <a href="/logout">Log out</a></nav>
<h1>{{#if name}}{{name}} ({{email}}){{else}}{{email}}{{/if}}</h1>
<h2>
  <a href="{{{prev_url}}}">&laquo;</a>
  {{label}}
  <a href="{{{next_url}}}">&raquo;</a>
</h2>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
<table class="month">
  <thead><tr><th>Sun</th><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th></tr></thead>
  <tbody>
  {{#each weeks}}
  <tr>
    {{#each this}}
    <td>{{#if day}}<strong>{{day}}</strong>{{#each events}}<div>{{text}}</div>{{/each}}{{/if}}</td>
    {{/each}}
  </tr>
  {{/each}}
  </tbody>
</table>
</body>
</html>
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_partial("head", LAYOUT_HEAD)
        .expect("Failed to register partial");
    registry
        .register_template_string(&Page::Login.to_string(), LOGIN_PAGE)
        .expect("Failed to register template");
    registry
        .register_template_string(&Page::Day.to_string(), DAY_PAGE)
        .expect("Failed to register template");
    registry
        .register_template_string(&Page::Month.to_string(), MONTH_PAGE)
        .expect("Failed to register template");
    registry
}
