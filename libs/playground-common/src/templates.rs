// Starter source for the language runner editor

const TEMPLATES: &[(&str, &str)] = &[
    ("javascript", "console.log('Hello, World!')\n"),
    ("python", "print('Hello, World!')\n"),
    (
        "cpp",
        "#include <bits/stdc++.h>\nusing namespace std;\nint main(){\n    ios::sync_with_stdio(false);\n    cin.tie(nullptr);\n    cout << \"Hello, World!\\n\";\n    return 0;\n}\n",
    ),
    (
        "c",
        "#include <stdio.h>\nint main(){\n    printf(\"Hello, World!\\n\");\n    return 0;\n}\n",
    ),
    (
        "java",
        "import java.io.*;\npublic class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}\n",
    ),
    (
        "go",
        "package main\nimport \"fmt\"\nfunc main(){\n    fmt.Println(\"Hello, World!\")\n}\n",
    ),
    ("php", "<?php\necho 'Hello, World!';\n"),
    ("ruby", "puts 'Hello, World!'\n"),
    ("rust", "fn main(){\n    println!(\"Hello, World!\");\n}\n"),
];

/// Starter source for a language id, if one exists
pub fn template_for(language: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
        .map(|(_, source)| *source)
}

/// True when `code` is one of the starter templates, ignoring surrounding whitespace
pub fn is_template(code: &str) -> bool {
    let code = code.trim();
    TEMPLATES.iter().any(|(_, source)| source.trim() == code)
}

/// Languages that ship a template, in menu order
pub fn languages() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|(lang, _)| *lang)
}
